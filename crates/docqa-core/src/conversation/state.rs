use serde::{Deserialize, Serialize};

/// Observable state of a conversation.
///
/// `AwaitingUpload` and `AwaitingAnswer` are transient sub-states entered while
/// a network request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// No document bound.
    Empty,
    /// A document is bound; the transcript may hold turns about it.
    Bound,
    AwaitingUpload,
    AwaitingAnswer,
}

impl ConversationState {
    /// Returns true while a network request is outstanding.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::AwaitingUpload | Self::AwaitingAnswer)
    }
}
