//! Infrastructure layer for the DocQA client: local storage, paths,
//! configuration loading and logging setup.

pub mod config_service;
pub mod logging;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::paths::DocQaPaths;
pub use crate::storage::{InMemoryStore, JsonFileStore};
