//! Builds the coordinator pair for a configured backend mode.

use crate::api_client::DocQaApiClient;
use crate::stub::StubCoordinator;
use docqa_core::config::{BackendConfig, BackendMode};
use docqa_core::error::{DocQaError, Result};
use docqa_core::remote::{QuestionCoordinator, UploadCoordinator};
use std::sync::Arc;

/// Upload and question coordinators sharing one backend.
#[derive(Clone)]
pub struct Coordinators {
    pub upload: Arc<dyn UploadCoordinator>,
    pub question: Arc<dyn QuestionCoordinator>,
}

impl std::fmt::Debug for Coordinators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinators").finish_non_exhaustive()
    }
}

/// Creates the coordinators described by `config`.
///
/// # Errors
///
/// Returns a config error if the HTTP client cannot be built.
pub fn build_coordinators(config: &BackendConfig) -> Result<Coordinators> {
    match config.mode {
        BackendMode::Http => {
            let client = Arc::new(DocQaApiClient::from_config(config).map_err(|e| {
                DocQaError::config(format!("Failed to build HTTP client: {}", e))
            })?);
            tracing::info!("[Coordinators] Using HTTP backend at {}", client.base_url());
            Ok(Coordinators {
                upload: client.clone(),
                question: client,
            })
        }
        BackendMode::Stub => {
            tracing::info!("[Coordinators] Using offline stub backend");
            let stub = Arc::new(StubCoordinator::new());
            Ok(Coordinators {
                upload: stub.clone(),
                question: stub,
            })
        }
    }
}
