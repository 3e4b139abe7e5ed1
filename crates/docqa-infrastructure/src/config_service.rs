//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the client configuration
//! from the configuration file (~/.config/docqa/config.toml) and layers
//! environment overrides on top.

use crate::paths::DocQaPaths;
use crate::storage::AtomicFile;
use docqa_core::config::DocQaConfig;
use docqa_core::error::{DocQaError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Overrides `backend.base_url`.
pub const ENV_BASE_URL: &str = "DOCQA_BASE_URL";
/// Overrides `backend.mode` (`http` or `stub`).
pub const ENV_BACKEND_MODE: &str = "DOCQA_BACKEND_MODE";
/// Overrides `storage.dir`.
pub const ENV_STORAGE_DIR: &str = "DOCQA_STORAGE_DIR";

/// Configuration service that loads and caches the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration, populated on first successful load.
    config: Arc<RwLock<Option<DocQaConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading `~/.config/docqa/config.toml`.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(DocQaPaths::config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading it from file if not cached.
    ///
    /// A missing file yields the defaults. Environment overrides from the
    /// process environment are applied on every fresh load.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if an override holds an invalid value.
    pub fn get_config(&self) -> Result<DocQaConfig> {
        if let Some(cached) = self.read_cache()?.as_ref() {
            return Ok(cached.clone());
        }

        let mut loaded = self.load_file()?;
        apply_env_overrides(&mut loaded, |name| std::env::var(name).ok())?;
        loaded.validate()?;

        *self.write_cache()? = Some(loaded.clone());
        Ok(loaded)
    }

    /// Writes `config` to the file and refreshes the cache.
    pub fn save_config(&self, config: &DocQaConfig) -> Result<()> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        AtomicFile::new(self.path.clone()).save(&config.to_toml_string()?)?;
        *self.write_cache()? = Some(config.clone());
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) -> Result<()> {
        *self.write_cache()? = None;
        Ok(())
    }

    fn load_file(&self) -> Result<DocQaConfig> {
        match AtomicFile::new(self.path.clone()).load()? {
            Some(content) => DocQaConfig::from_toml_str(&content).map_err(|e| {
                DocQaError::config(format!(
                    "Failed to parse configuration file at {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            None => {
                tracing::debug!(
                    "[ConfigService] No config file at {}, using defaults",
                    self.path.display()
                );
                Ok(DocQaConfig::default())
            }
        }
    }

    fn read_cache(&self) -> Result<std::sync::RwLockReadGuard<'_, Option<DocQaConfig>>> {
        self.config
            .read()
            .map_err(|e| DocQaError::internal(format!("Config cache poisoned: {}", e)))
    }

    fn write_cache(&self) -> Result<std::sync::RwLockWriteGuard<'_, Option<DocQaConfig>>> {
        self.config
            .write()
            .map_err(|e| DocQaError::internal(format!("Config cache poisoned: {}", e)))
    }
}

/// Applies `DOCQA_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut DocQaConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.backend.base_url = base_url;
    }
    if let Some(mode) = lookup(ENV_BACKEND_MODE).filter(|v| !v.trim().is_empty()) {
        config.backend.mode = mode.parse()?;
    }
    if let Some(dir) = lookup(ENV_STORAGE_DIR).filter(|v| !v.trim().is_empty()) {
        config.storage.dir = Some(PathBuf::from(dir));
    }
    Ok(())
}

/// Directory the conversation store lives in for `config`.
pub fn resolve_storage_dir(config: &DocQaConfig) -> Result<PathBuf> {
    match &config.storage.dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(DocQaPaths::conversations_dir()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::config::BackendMode;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));

        let mut config = service.load_file().unwrap();
        apply_env_overrides(&mut config, |_| None).unwrap();

        assert_eq!(config, DocQaConfig::default());
    }

    #[test]
    fn test_save_then_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let service = ConfigService::new(&path);

        let mut config = DocQaConfig::default();
        config.backend.mode = BackendMode::Stub;
        config.conversation.allow_unscoped_questions = false;
        service.save_config(&config).unwrap();

        let reloaded = ConfigService::new(&path).load_file().unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[backend\nmode = ").unwrap();

        let err = ConfigService::new(&path).load_file().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_BASE_URL, "http://qa.internal:9000"),
            (ENV_BACKEND_MODE, "stub"),
            (ENV_STORAGE_DIR, "/var/lib/docqa"),
        ]);
        let mut config = DocQaConfig::default();

        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.backend.base_url, "http://qa.internal:9000");
        assert_eq!(config.backend.mode, BackendMode::Stub);
        assert_eq!(config.storage.dir, Some(PathBuf::from("/var/lib/docqa")));
    }

    #[test]
    fn test_invalid_mode_override_is_error() {
        let mut config = DocQaConfig::default();
        let result = apply_env_overrides(&mut config, |name| {
            (name == ENV_BACKEND_MODE).then(|| "carrier-pigeon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_storage_dir_prefers_explicit_dir() {
        let mut config = DocQaConfig::default();
        config.storage.dir = Some(PathBuf::from("/data/docqa"));
        assert_eq!(resolve_storage_dir(&config).unwrap(), PathBuf::from("/data/docqa"));
    }
}
