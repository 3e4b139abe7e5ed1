//! Storage layer for atomic file operations and key-value stores.

mod atomic_file;
mod json_file_store;
mod memory_store;

pub use atomic_file::{AtomicFile, AtomicFileError};
pub use json_file_store::JsonFileStore;
pub use memory_store::InMemoryStore;
