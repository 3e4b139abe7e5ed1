//! Offline coordinator that never touches the network.

use async_trait::async_trait;
use docqa_core::document::DocumentFile;
use docqa_core::remote::{
    AskError, QuestionCoordinator, UploadCoordinator, UploadError, UploadReceipt,
};
use docqa_core::session::SessionHandle;

/// Fixed answer returned for every question.
pub const STUB_ANSWER: &str = "Agent response goes here!";
/// Status text returned for every upload.
pub const STUB_UPLOAD_MESSAGE: &str = "Document uploaded and indexed successfully";

/// Answers every question with [`STUB_ANSWER`] and accepts every upload
/// under a fresh random handle.
#[derive(Debug, Clone, Default)]
pub struct StubCoordinator;

impl StubCoordinator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UploadCoordinator for StubCoordinator {
    async fn submit(&self, file: &DocumentFile) -> Result<UploadReceipt, UploadError> {
        file.validate()?;
        let handle = SessionHandle::new(uuid::Uuid::new_v4().to_string());
        tracing::debug!(
            "[StubCoordinator] Accepted '{}' as session {}",
            file.file_name(),
            handle
        );
        Ok(UploadReceipt {
            handle,
            message: STUB_UPLOAD_MESSAGE.to_string(),
            filename: Some(file.file_name().to_string()),
        })
    }
}

#[async_trait]
impl QuestionCoordinator for StubCoordinator {
    async fn ask(
        &self,
        _question: &str,
        _handle: Option<&SessionHandle>,
    ) -> Result<String, AskError> {
        Ok(STUB_ANSWER.to_string())
    }
}
