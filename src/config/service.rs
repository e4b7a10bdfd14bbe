//! Configuration service system for dependency injection and test isolation.
//!
//! This module abstracts configuration loading behind the
//! [`ConfigService`] trait so production code reads layered sources
//! (defaults, user file, `VOCALIS_*` environment variables) while tests
//! inject a fixed [`Config`] without touching global state.

use crate::config::Config;
use crate::{Result, error::VocalisError};
use config::{Config as ConfigCrate, Environment, File};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Configuration service trait for dependency injection.
pub trait ConfigService: Send + Sync {
    /// Get the current configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or validation fails.
    fn get_config(&self) -> Result<Config>;

    /// Force a reload from all sources, discarding cached values.
    fn reload(&self) -> Result<()>;

    /// Default configuration file path for this service.
    fn get_config_file_path(&self) -> Result<PathBuf>;

    /// Persist the given configuration to the default file location.
    fn save_config(&self, config: &Config) -> Result<()>;
}

/// Production configuration service implementation.
///
/// Sources in priority order: `VOCALIS_*` environment variables, the user
/// configuration file, built-in defaults. The parsed configuration is
/// cached until [`ConfigService::reload`].
pub struct ProductionConfigService {
    config_file_path: PathBuf,
    cached_config: Arc<RwLock<Option<Config>>>,
}

impl ProductionConfigService {
    /// Create a new production configuration service.
    pub fn new() -> Result<Self> {
        let config_file_path = match std::env::var("VOCALIS_CONFIG_PATH") {
            Ok(custom) => PathBuf::from(custom),
            Err(_) => Self::user_config_path(),
        };
        Ok(Self {
            config_file_path,
            cached_config: Arc::new(RwLock::new(None)),
        })
    }

    /// Create a service reading a specific configuration file.
    pub fn with_config_file(path: PathBuf) -> Self {
        Self {
            config_file_path: path,
            cached_config: Arc::new(RwLock::new(None)),
        }
    }

    /// The user configuration file path,
    /// typically `$CONFIG_DIR/vocalis/config.toml`.
    fn user_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocalis")
            .join("config.toml")
    }

    /// Load and validate configuration from all sources.
    fn load_and_validate(&self) -> Result<Config> {
        debug!("ProductionConfigService: loading configuration from sources");

        let builder = ConfigCrate::builder()
            .add_source(File::from(self.config_file_path.clone()).required(false))
            .add_source(Environment::with_prefix("VOCALIS").separator("__"));

        let config_crate = builder.build().map_err(|e| {
            VocalisError::config(format!("Failed to build configuration: {}", e))
        })?;

        let mut app_config: Config = config_crate.try_deserialize().map_err(|e| {
            VocalisError::config(format!("Failed to parse configuration: {}", e))
        })?;

        // Direct OPENAI_API_KEY support for parity with other tooling.
        if app_config.transcriber.api_key.is_none() {
            if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
                debug!("ProductionConfigService: using OPENAI_API_KEY from environment");
                app_config.transcriber.api_key = Some(api_key);
            }
        }

        if self.config_file_path.exists() {
            app_config.loaded_from = Some(self.config_file_path.clone());
        }

        crate::config::validator::validate_config(&app_config)?;

        debug!("ProductionConfigService: configuration loaded and validated");
        Ok(app_config)
    }

    fn write_config(path: &Path, config: &Config) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(config).map_err(|e| {
            VocalisError::config(format!("Failed to serialize configuration: {}", e))
        })?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}

impl ConfigService for ProductionConfigService {
    fn get_config(&self) -> Result<Config> {
        {
            let cached = self.cached_config.read().unwrap();
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }
        let config = self.load_and_validate()?;
        *self.cached_config.write().unwrap() = Some(config.clone());
        Ok(config)
    }

    fn reload(&self) -> Result<()> {
        *self.cached_config.write().unwrap() = None;
        self.get_config().map(|_| ())
    }

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.config_file_path.clone())
    }

    fn save_config(&self, config: &Config) -> Result<()> {
        crate::config::validator::validate_config(config)?;
        Self::write_config(&self.config_file_path, config)?;
        *self.cached_config.write().unwrap() = Some(config.clone());
        Ok(())
    }
}

/// Test configuration service returning a fixed configuration.
pub struct TestConfigService {
    config: RwLock<Config>,
}

impl TestConfigService {
    /// Wrap a prepared configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Service with all defaults.
    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }

    /// Replace the held configuration.
    pub fn set_config(&self, config: Config) {
        *self.config.write().unwrap() = config;
    }
}

impl ConfigService for TestConfigService {
    fn get_config(&self) -> Result<Config> {
        Ok(self.config.read().unwrap().clone())
    }

    fn reload(&self) -> Result<()> {
        Ok(())
    }

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(PathBuf::from("/tmp/vocalis-test-config.toml"))
    }

    fn save_config(&self, config: &Config) -> Result<()> {
        self.set_config(config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_test_service_round_trip() {
        let service = TestConfigService::with_defaults();
        let mut config = service.get_config().unwrap();
        config.general.worker_count = 2;
        service.save_config(&config).unwrap();
        assert_eq!(service.get_config().unwrap().general.worker_count, 2);
    }

    #[test]
    fn test_production_service_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nworker_count = 3\n").unwrap();
        let service = ProductionConfigService::with_config_file(path.clone());
        let config = service.get_config().unwrap();
        assert_eq!(config.general.worker_count, 3);
        assert_eq!(config.loaded_from, Some(path));
    }

    #[test]
    fn test_production_service_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let service =
            ProductionConfigService::with_config_file(dir.path().join("absent.toml"));
        let config = service.get_config().unwrap();
        assert_eq!(config.transcriber.model, "whisper-1");
        assert!(config.loaded_from.is_none());
    }

    #[test]
    fn test_production_service_rejects_unknown_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nmystery_option = 1\n").unwrap();
        let service = ProductionConfigService::with_config_file(path);
        assert!(service.get_config().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let service = ProductionConfigService::with_config_file(path.clone());
        let mut config = service.get_config().unwrap();
        config.general.analyzer_timeout_ms = 5000;
        service.save_config(&config).unwrap();
        service.reload().unwrap();
        assert_eq!(service.get_config().unwrap().general.analyzer_timeout_ms, 5000);
    }
}
