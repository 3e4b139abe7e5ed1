//! Client configuration model.
//!
//! Every section and field is optional in the TOML file; missing values fall
//! back to the defaults below.

use crate::error::{DocQaError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
/// Storage key used by the original web client, kept so existing histories load.
pub const DEFAULT_STORAGE_KEY: &str = "chatHistory";

/// Which coordinator implementations back the conversation.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Real upload/ask HTTP endpoints.
    #[default]
    Http,
    /// Local stub answering fixed text, no network.
    Stub,
}

impl FromStr for BackendMode {
    type Err = DocQaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "stub" => Ok(Self::Stub),
            other => Err(DocQaError::config(format!(
                "Unknown backend mode '{}', expected 'http' or 'stub'",
                other
            ))),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    pub mode: BackendMode,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ConversationConfig {
    /// Key the conversation image is stored under.
    pub storage_key: String,
    /// Whether questions may be sent while no document is bound.
    pub allow_unscoped_questions: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            allow_unscoped_questions: true,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the conversation store. `None` means the platform
    /// default under the user's config directory.
    pub dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DocQaConfig {
    pub backend: BackendConfig,
    pub conversation: ConversationConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl DocQaConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values that cannot work at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.conversation.storage_key.trim().is_empty() {
            return Err(DocQaError::config("conversation.storage_key must not be empty"));
        }
        if self.backend.mode == BackendMode::Http && self.backend.base_url.trim().is_empty() {
            return Err(DocQaError::config(
                "backend.base_url is required when backend.mode = \"http\"",
            ));
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(DocQaError::config(
                "backend.request_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }
}
