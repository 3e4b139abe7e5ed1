//! Remote collaborator interfaces.
//!
//! The conversation controller reaches the document ingestion and
//! question-answering services only through these traits, so the HTTP client
//! and the offline stub are interchangeable.

use crate::document::{DocumentFile, RejectReason};
use crate::session::SessionHandle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Session handle for the ingested document.
    pub handle: SessionHandle,
    /// Human-readable status text from the server, passed through untouched.
    pub message: String,
    /// File name as recorded by the server, when it reports one.
    #[serde(default)]
    pub filename: Option<String>,
}

/// Why an upload did not produce a new session.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadError {
    /// The file failed local validation; nothing was sent.
    #[error("{0}")]
    Rejected(RejectReason),

    /// Network or server failure.
    #[error("Upload failed: {0}")]
    TransportFailed(String),

    /// Another upload or question is still in flight.
    #[error("Another request is still in progress.")]
    Busy,

    /// The conversation was reset while the upload was in flight; the result
    /// was dropped.
    #[error("Upload finished after the conversation was reset; result discarded.")]
    Superseded,
}

impl UploadError {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl From<RejectReason> for UploadError {
    fn from(reason: RejectReason) -> Self {
        Self::Rejected(reason)
    }
}

/// Why a question did not produce an answer.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AskError {
    /// Network or server failure.
    #[error("Question failed: {0}")]
    TransportFailed(String),
}

/// Sends a validated document to the ingestion service.
#[async_trait]
pub trait UploadCoordinator: Send + Sync {
    /// Uploads `file` and returns the session handle it was ingested under.
    ///
    /// Implementations run [`DocumentFile::validate`] before any network
    /// activity and return [`UploadError::Rejected`] without sending anything
    /// when it fails. They must not touch any conversation state.
    async fn submit(&self, file: &DocumentFile) -> Result<UploadReceipt, UploadError>;
}

/// Sends a question to the answering service.
#[async_trait]
pub trait QuestionCoordinator: Send + Sync {
    /// Asks `question`, scoped to `handle` when one is bound.
    ///
    /// Returns the answer text verbatim. No retries are attempted.
    async fn ask(&self, question: &str, handle: Option<&SessionHandle>)
    -> Result<String, AskError>;
}
