//! Domain layer for the DocQA conversation client.
//!
//! Holds the conversation model (messages, transcript, session binding), the
//! upload validation rules, and the traits the application layer uses to reach
//! remote collaborators and local storage.

pub mod config;
pub mod conversation;
pub mod document;
pub mod error;
pub mod remote;
pub mod session;
pub mod storage;

// Re-export common error type
pub use error::DocQaError;
