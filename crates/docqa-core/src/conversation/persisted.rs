//! Durable image of a conversation.
//!
//! The image is what gets written to the key-value store under the
//! conversation key after every committed mutation. It carries both the
//! transcript and the bound session handle so a reload can keep asking
//! questions against the same document.

use super::message::Message;
use super::transcript::Transcript;
use crate::error::{DocQaError, Result};
use crate::session::SessionHandle;
use serde::{Deserialize, Serialize};

/// Current layout version written by this client.
pub const PERSISTED_STATE_VERSION: u32 = 1;

/// The persisted `{ messages, session_id }` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedConversationState {
    #[serde(default = "default_version")]
    pub version: u32,
    pub messages: Transcript,
    #[serde(default)]
    pub session_id: Option<SessionHandle>,
}

fn default_version() -> u32 {
    PERSISTED_STATE_VERSION
}

/// Every layout the loader understands.
#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedImage {
    Versioned(PersistedConversationState),
    /// Bare `[{id, text, sender}]` array written by the first web client.
    Legacy(Vec<Message>),
}

impl PersistedConversationState {
    pub fn new(messages: Transcript, session_id: Option<SessionHandle>) -> Self {
        Self {
            version: PERSISTED_STATE_VERSION,
            messages,
            session_id,
        }
    }

    /// Parses a stored value, accepting both the versioned and the legacy layout.
    ///
    /// An image containing the id `u64::MAX` is rejected: no later id could
    /// be issued after it.
    pub fn decode(raw: &str) -> Result<Self> {
        let image: PersistedImage = serde_json::from_str(raw)?;
        let state = match image {
            PersistedImage::Versioned(state) => state,
            PersistedImage::Legacy(messages) => Self::new(Transcript::from(messages), None),
        };
        if state.messages.iter().any(|m| m.id.value() == u64::MAX) {
            return Err(DocQaError::data_access("Persisted message id is out of range"));
        }
        Ok(state)
    }

    /// Serializes the image in the current layout.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
