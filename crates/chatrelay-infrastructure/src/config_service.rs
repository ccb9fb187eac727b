//! Configuration service implementation.
//!
//! Loads [`RelayConfig`] from `~/.config/chatrelay/config.toml` (or an
//! explicit path) and caches it.

use chatrelay_core::RelayConfig;
use chatrelay_core::error::{ChatRelayError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::paths::ChatRelayPaths;

/// Configuration service that loads and caches the relay configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Overrides the platform config file when set.
    path: Option<PathBuf>,
    config: Arc<RwLock<Option<RelayConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the platform config file.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading `path` instead of the platform config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A missing file yields the defaults. A file that exists but does not
    /// parse is a `Config` error.
    pub fn get_config(&self) -> Result<RelayConfig> {
        {
            let cached = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = self.load_config()?;

        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = None;
    }

    /// Store file for `config`: its `store_path`, or the platform default.
    pub fn resolve_store_path(config: &RelayConfig) -> Result<PathBuf> {
        match &config.store_path {
            Some(path) => Ok(path.clone()),
            None => Ok(ChatRelayPaths::default_store_file()?),
        }
    }

    fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(ChatRelayPaths::config_file()?),
        }
    }

    fn load_config(&self) -> Result<RelayConfig> {
        let path = self.config_path()?;
        if !path.exists() {
            tracing::debug!(
                "[ConfigService] {} not found, using defaults",
                path.display()
            );
            return Ok(RelayConfig::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = RelayConfig::from_toml_str(&content).map_err(|e| invalid(&path, e))?;
        tracing::info!("[ConfigService] loaded {}", path.display());
        Ok(config)
    }
}

fn invalid(path: &Path, err: ChatRelayError) -> ChatRelayError {
    ChatRelayError::config(format!("invalid config {}: {}", path.display(), err))
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_core::{Platform, RelativeTimeLocale};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        assert_eq!(service.get_config().unwrap(), RelayConfig::default());
    }

    #[test]
    fn test_loads_and_caches() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "locale = \"en\"\nplatform = \"ios\"\n").unwrap();

        let service = ConfigService::with_path(&path);
        let config = service.get_config().unwrap();
        assert_eq!(config.locale, RelativeTimeLocale::En);
        assert_eq!(config.platform, Platform::Ios);

        std::fs::write(&path, "locale = \"zh-cn\"\n").unwrap();
        assert_eq!(service.get_config().unwrap().locale, RelativeTimeLocale::En);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().locale, RelativeTimeLocale::ZhCn);
    }

    #[test]
    fn test_unparsable_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "history_page_size = \"many\"").unwrap();

        let err = ConfigService::with_path(&path).get_config().unwrap_err();
        assert!(matches!(err, ChatRelayError::Config(_)));
    }

    #[test]
    fn test_explicit_store_path_wins() {
        let config = RelayConfig {
            store_path: Some(PathBuf::from("/tmp/relay.json")),
            ..Default::default()
        };
        assert_eq!(
            ConfigService::resolve_store_path(&config).unwrap(),
            PathBuf::from("/tmp/relay.json")
        );
    }
}
