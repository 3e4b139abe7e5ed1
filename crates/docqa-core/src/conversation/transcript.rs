//! Transcript domain model.

use super::message::{Message, MessageId};
use serde::{Deserialize, Serialize};

/// The ordered message history of one conversation.
///
/// Entries keep insertion order and are never edited, re-sorted or removed
/// individually; the only way to drop entries is [`Transcript::clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends the transcript with `entries`, keeping their order.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = Message>) {
        self.messages.extend(entries);
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the id of the most recent entry, if any.
    pub fn last_id(&self) -> Option<MessageId> {
        self.messages.iter().map(|m| m.id).max()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}

impl From<Vec<Message>> for Transcript {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl IntoIterator for Transcript {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::message::{MessageIdGenerator, Sender};

    #[test]
    fn test_extend_preserves_insertion_order() {
        let mut ids = MessageIdGenerator::new();
        let mut transcript = Transcript::new();

        let a = ids.message(Sender::User, "a");
        let b = ids.message(Sender::Agent, "b");
        let c = ids.message(Sender::User, "c");

        transcript.extend(vec![a.clone()]);
        transcript.extend(vec![b.clone(), c.clone()]);

        assert_eq!(transcript.messages(), &[a, b, c]);
    }

    #[test]
    fn test_identical_text_is_not_deduplicated() {
        let mut ids = MessageIdGenerator::new();
        let mut transcript = Transcript::new();

        transcript.extend(vec![ids.message(Sender::User, "same")]);
        transcript.extend(vec![ids.message(Sender::User, "same")]);

        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_clear_and_last_id() {
        let mut ids = MessageIdGenerator::new();
        let mut transcript = Transcript::new();
        assert_eq!(transcript.last_id(), None);

        let message = ids.message(Sender::User, "q");
        let id = message.id;
        transcript.extend(vec![message]);
        assert_eq!(transcript.last_id(), Some(id));

        transcript.clear();
        assert!(transcript.is_empty());
    }
}
