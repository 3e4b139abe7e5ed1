//! Application layer for the DocQA client.
//!
//! This crate provides the conversation use case: the controller that owns a
//! transcript and its session binding, and the store that mirrors them to
//! local storage.

pub mod conversation_controller;
pub mod transcript_store;

pub use conversation_controller::{AskOutcome, ConversationController};
pub use transcript_store::TranscriptStore;
