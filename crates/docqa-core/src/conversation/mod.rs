//! Conversation domain module.
//!
//! # Module Structure
//!
//! - `message`: Transcript entries (`Message`, `Sender`, `MessageId`)
//! - `transcript`: The ordered, append-only history (`Transcript`)
//! - `persisted`: The durable image written to the key-value store
//! - `state`: Observable conversation states (`ConversationState`)

mod message;
mod persisted;
mod state;
mod transcript;

pub use message::{Message, MessageId, MessageIdGenerator, Sender};
pub use persisted::{PERSISTED_STATE_VERSION, PersistedConversationState};
pub use state::ConversationState;
pub use transcript::Transcript;

/// Agent text recorded when a question could not be answered.
pub const ANSWER_ERROR_TEXT: &str = "Error getting answer.";
