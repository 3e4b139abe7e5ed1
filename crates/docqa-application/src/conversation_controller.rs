//! Conversation controller.
//!
//! This module provides the `ConversationController`, the single owner of the
//! transcript and the session binding. It exposes the four user intents
//! (upload, ask, clear, start new) and delegates network work to the upload
//! and question coordinators.
//!
//! # Concurrency
//!
//! Controller state sits behind a `tokio::sync::Mutex` that is never held
//! across a coordinator call. At most one network intent is in flight; a
//! second one is refused as busy. Every reset advances a generation counter,
//! and a response that started under an older generation is dropped without
//! touching the transcript.

use anyhow::Result;
use docqa_core::config::{ConversationConfig, DocQaConfig};
use docqa_core::conversation::{
    ANSWER_ERROR_TEXT, ConversationState, Message, MessageIdGenerator, Sender, Transcript,
};
use docqa_core::document::DocumentFile;
use docqa_core::remote::{
    AskError, QuestionCoordinator, UploadCoordinator, UploadError, UploadReceipt,
};
use docqa_core::session::{SessionBinding, SessionHandle};
use docqa_core::storage::KeyValueStore;
use docqa_infrastructure::JsonFileStore;
use docqa_infrastructure::config_service::resolve_storage_dir;
use docqa_interaction::{Coordinators, build_coordinators};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::transcript_store::TranscriptStore;

/// Result of an `ask` intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// The question was empty or whitespace only. Nothing changed.
    Ignored,
    /// Another request is in flight. Nothing changed.
    Busy,
    /// No document is bound and unscoped questions are disabled. Nothing changed.
    NoDocument,
    /// The answer was appended after the user's question.
    Answered(Message),
    /// The request failed; the fallback agent message was appended.
    Failed { error: AskError, message: Message },
    /// The conversation was reset while waiting; the answer was dropped.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingRequest {
    Upload,
    Answer,
}

struct ControllerInner {
    store: TranscriptStore,
    binding: SessionBinding,
    ids: MessageIdGenerator,
    /// Advanced by every reset; stale responses compare against it.
    generation: u64,
    pending: Option<PendingRequest>,
}

impl ControllerInner {
    fn state(&self) -> ConversationState {
        match self.pending {
            Some(PendingRequest::Upload) => ConversationState::AwaitingUpload,
            Some(PendingRequest::Answer) => ConversationState::AwaitingAnswer,
            None if self.binding.is_bound() => ConversationState::Bound,
            None => ConversationState::Empty,
        }
    }

    /// Clears the transcript, keeping the current binding in storage, and
    /// releases the in-flight slot.
    async fn reset(&mut self) {
        self.generation += 1;
        self.pending = None;

        if let Err(e) = self.store.reset_keeping(&self.binding).await {
            tracing::warn!("[ConversationController] Failed to reset persisted state: {}", e);
        }
    }

    async fn append(&mut self, message: Message) {
        if let Err(e) = self.store.append([message]).await {
            tracing::warn!("[ConversationController] Failed to persist transcript: {}", e);
        }
    }
}

/// Owns one conversation: its transcript, its session binding and the
/// coordinators it talks to.
pub struct ConversationController {
    inner: Mutex<ControllerInner>,
    uploads: Arc<dyn UploadCoordinator>,
    questions: Arc<dyn QuestionCoordinator>,
    allow_unscoped_questions: bool,
}

impl ConversationController {
    /// Opens the conversation persisted in `store`, restoring its transcript
    /// and binding.
    pub async fn open(
        store: Arc<dyn KeyValueStore>,
        coordinators: Coordinators,
        settings: &ConversationConfig,
    ) -> Self {
        let mut transcript_store = TranscriptStore::new(store, settings.storage_key.clone());
        let transcript = transcript_store.load().await;
        let binding = SessionBinding::restored(transcript_store.restored_binding().cloned());
        let ids = MessageIdGenerator::resume_after(transcript.last_id());

        tracing::info!(
            "[ConversationController] Opened '{}' with {} messages (session: {})",
            settings.storage_key,
            transcript.len(),
            binding
                .current()
                .map(SessionHandle::as_str)
                .unwrap_or("none")
        );

        Self {
            inner: Mutex::new(ControllerInner {
                store: transcript_store,
                binding,
                ids,
                generation: 0,
                pending: None,
            }),
            uploads: coordinators.upload,
            questions: coordinators.question,
            allow_unscoped_questions: settings.allow_unscoped_questions,
        }
    }

    /// Builds a controller from configuration: file-backed storage in the
    /// configured directory and the configured backend.
    pub async fn from_config(config: &DocQaConfig) -> Result<Self> {
        let dir = resolve_storage_dir(config)?;
        let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(&dir)?);
        let coordinators = build_coordinators(&config.backend)?;
        Ok(Self::open(store, coordinators, &config.conversation).await)
    }

    /// Current state, including transient in-flight states.
    pub async fn state(&self) -> ConversationState {
        self.inner.lock().await.state()
    }

    /// Copy of the current transcript.
    pub async fn snapshot(&self) -> Transcript {
        self.inner.lock().await.store.snapshot().clone()
    }

    /// Handle the conversation is bound to, if any.
    pub async fn current_session(&self) -> Option<SessionHandle> {
        self.inner.lock().await.binding.current().cloned()
    }

    /// Validates and uploads `file`.
    ///
    /// On success the conversation is bound to the new handle with an empty
    /// transcript, and the server's status message is returned. On any
    /// failure the previous binding and transcript stay as they were.
    pub async fn upload(&self, file: DocumentFile) -> Result<UploadReceipt, UploadError> {
        let kind = file.validate()?;

        let generation = {
            let mut inner = self.inner.lock().await;
            if inner.pending.is_some() {
                return Err(UploadError::Busy);
            }
            inner.pending = Some(PendingRequest::Upload);
            inner.generation
        };

        tracing::debug!(
            "[ConversationController] Uploading '{}' as {:?}",
            file.file_name(),
            kind
        );
        let result = self.uploads.submit(&file).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            tracing::warn!(
                "[ConversationController] Upload of '{}' finished after a reset, discarding",
                file.file_name()
            );
            return Err(UploadError::Superseded);
        }
        inner.pending = None;

        let receipt = result.inspect_err(|e| {
            tracing::warn!("[ConversationController] Upload failed: {}", e);
        })?;

        inner.binding.bind(receipt.handle.clone());
        inner.reset().await;

        tracing::info!(
            "[ConversationController] Bound to session {} ({})",
            receipt.handle,
            file.file_name()
        );
        Ok(receipt)
    }

    /// Asks `text` against the bound document.
    ///
    /// The user's message is appended before the request goes out; the
    /// answer, or the fallback error text, is appended when it returns.
    pub async fn ask(&self, text: &str) -> AskOutcome {
        if text.trim().is_empty() {
            return AskOutcome::Ignored;
        }

        let (generation, handle) = {
            let mut inner = self.inner.lock().await;
            if inner.pending.is_some() {
                return AskOutcome::Busy;
            }
            if !inner.binding.is_bound() && !self.allow_unscoped_questions {
                return AskOutcome::NoDocument;
            }

            let question = inner.ids.message(Sender::User, text);
            inner.append(question).await;
            inner.pending = Some(PendingRequest::Answer);
            (inner.generation, inner.binding.current().cloned())
        };

        let result = self.questions.ask(text, handle.as_ref()).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            tracing::warn!("[ConversationController] Answer arrived after a reset, discarding");
            return AskOutcome::Discarded;
        }
        inner.pending = None;

        match result {
            Ok(answer) => {
                let message = inner.ids.message(Sender::Agent, answer);
                inner.append(message.clone()).await;
                tracing::info!("[ConversationController] Answer received ({})", message.id);
                AskOutcome::Answered(message)
            }
            Err(error) => {
                tracing::warn!("[ConversationController] {}", error);
                let message = inner.ids.message(Sender::Agent, ANSWER_ERROR_TEXT);
                inner.append(message.clone()).await;
                AskOutcome::Failed { error, message }
            }
        }
    }

    /// Empties the transcript. The binding is kept.
    pub async fn clear_chat(&self) {
        let mut inner = self.inner.lock().await;
        inner.reset().await;
        tracing::info!("[ConversationController] Chat cleared");
    }

    /// Empties the transcript and drops the binding.
    pub async fn new_chat(&self) {
        let mut inner = self.inner.lock().await;
        inner.binding.unbind();
        inner.reset().await;
        tracing::info!("[ConversationController] Started new chat");
    }
}
