//! Conversation message types.
//!
//! This module contains types for representing the entries of a transcript:
//! who sent them, what they said, and the identifier that fixes their order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the sender of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message typed by the user.
    User,
    /// Message produced by the answering agent (or synthesized on its behalf).
    Agent,
}

/// Opaque, monotonically increasing message identifier.
///
/// Identifiers are derived from the wall clock in milliseconds, so they keep
/// increasing across process restarts as long as the generator is seeded with
/// the last persisted id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    /// Wraps a raw identifier value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single entry of a transcript.
///
/// Messages are immutable once created; the transcript only ever appends them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Ordering identifier.
    pub id: MessageId,
    /// Who produced the message.
    pub sender: Sender,
    /// The message text, stored verbatim.
    pub text: String,
    /// Timestamp when the message was created (RFC 3339). Absent in images
    /// written by older clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Message {
    /// Returns true if the message was typed by the user.
    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Hands out strictly increasing [`MessageId`]s.
#[derive(Debug, Clone, Default)]
pub struct MessageIdGenerator {
    last: Option<MessageId>,
}

impl MessageIdGenerator {
    /// Creates a generator that has not issued any id yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator whose next id is guaranteed to be greater than `last`.
    pub fn resume_after(last: Option<MessageId>) -> Self {
        Self { last }
    }

    /// Issues the next id using the current wall clock.
    pub fn next_id(&mut self) -> MessageId {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        self.next_id_at(now)
    }

    /// Issues the next id for the given clock reading.
    ///
    /// When the clock has not advanced past the previous id (same millisecond,
    /// or the clock went backwards) the previous id plus one is used instead.
    /// `u64::MAX` has no successor; persisted images holding it are rejected
    /// on decode, so a generator never resumes there.
    pub fn next_id_at(&mut self, now_millis: u64) -> MessageId {
        let candidate = match self.last {
            Some(last) if now_millis <= last.0 => last.0.saturating_add(1),
            _ => now_millis,
        };
        let id = MessageId(candidate);
        self.last = Some(id);
        id
    }

    /// Builds a message with a freshly issued id and the current timestamp.
    pub fn message(&mut self, sender: Sender, text: impl Into<String>) -> Message {
        Message {
            id: self.next_id(),
            sender,
            text: text.into(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_strictly_increasing_within_same_millisecond() {
        let mut ids = MessageIdGenerator::new();
        let first = ids.next_id_at(1_000);
        let second = ids.next_id_at(1_000);
        let third = ids.next_id_at(999);

        assert_eq!(first.value(), 1_000);
        assert_eq!(second.value(), 1_001);
        assert_eq!(third.value(), 1_002);
    }

    #[test]
    fn test_resume_after_skips_past_persisted_id() {
        let mut ids = MessageIdGenerator::resume_after(Some(MessageId::new(5_000)));
        assert_eq!(ids.next_id_at(4_000).value(), 5_001);
        assert_eq!(ids.next_id_at(9_000).value(), 9_000);
    }

    #[test]
    fn test_next_id_after_max_does_not_overflow() {
        let mut ids = MessageIdGenerator::resume_after(Some(MessageId::new(u64::MAX)));
        assert_eq!(ids.next_id_at(1_000).value(), u64::MAX);
    }

    #[test]
    fn test_message_builder_sets_sender_and_timestamp() {
        let mut ids = MessageIdGenerator::new();
        let message = ids.message(Sender::User, "hello");
        assert!(message.is_from_user());
        assert_eq!(message.text, "hello");
        assert!(message.created_at.is_some());
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        let json = serde_json::to_string(&Sender::Agent).unwrap();
        assert_eq!(json, "\"agent\"");
    }
}
