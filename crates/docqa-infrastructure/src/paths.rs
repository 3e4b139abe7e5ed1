//! Unified path management for DocQA files.
//!
//! All locations are resolved from the platform config directory via `dirs`.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for docqa_core::DocQaError {
    fn from(e: PathError) -> Self {
        docqa_core::DocQaError::config(e.to_string())
    }
}

/// Unified path management for DocQA.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/docqa/              # Config directory
/// ├── config.toml               # Client configuration
/// └── conversations/            # Key-value store (JsonFileStore)
///     └── chatHistory.json
/// ```
pub struct DocQaPaths;

impl DocQaPaths {
    const APP_DIR: &'static str = "docqa";

    /// Returns the DocQA configuration directory (e.g., `~/.config/docqa/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default directory for the conversation store.
    pub fn conversations_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("conversations"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_config_dir() {
        // dirs::config_dir() is None only on exotic platforms without HOME.
        if let Ok(config_dir) = DocQaPaths::config_dir() {
            assert!(config_dir.ends_with("docqa"));
            assert_eq!(
                DocQaPaths::config_file().unwrap(),
                config_dir.join("config.toml")
            );
            assert_eq!(
                DocQaPaths::conversations_dir().unwrap(),
                config_dir.join("conversations")
            );
        }
    }
}
