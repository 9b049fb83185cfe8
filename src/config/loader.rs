//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles TOML file discovery,
//! environment detection and layering through the `config` crate.

use super::error::{ConfigResult, ConfigurationError};
use super::HandlerChainConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, Map};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const BASE_FILE_STEM: &str = "handler-chain";
const ENV_PREFIX: &str = "HANDLER_CHAIN";

/// Loaded, validated configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: HandlerChainConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_layered(config_dir, environment, Self::environment_source(None))
    }

    fn load_layered(
        config_dir: Option<PathBuf>,
        environment: &str,
        overrides: Environment,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);
        let base = config_directory.join(format!("{BASE_FILE_STEM}.toml"));
        let overlay = config_directory.join(format!("{BASE_FILE_STEM}.{environment}.toml"));

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let builder = Config::builder()
            .add_source(File::from(base.as_path()).required(false))
            .add_source(File::from(overlay.as_path()).required(false))
            .add_source(overrides);

        let config = Self::build(builder, &config_directory.display().to_string())?;
        Ok(Arc::new(Self::finish(
            config,
            environment,
            config_directory,
        )?))
    }

    /// Load one explicit file (plus environment variable overrides).
    pub fn load_from_file(path: &Path) -> ConfigResult<Arc<ConfigManager>> {
        if !path.is_file() {
            return Err(ConfigurationError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let builder = Config::builder()
            .add_source(File::from(path).required(true))
            .add_source(Self::environment_source(None));

        let config = Self::build(builder, &path.display().to_string())?;
        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Arc::new(Self::finish(
            config,
            &Self::detect_environment(),
            directory,
        )?))
    }

    /// Parse and validate TOML text without consulting files or the environment.
    pub fn from_toml_str(contents: &str) -> ConfigResult<HandlerChainConfig> {
        let builder = Config::builder().add_source(File::from_str(contents, FileFormat::Toml));
        let config = Self::build(builder, "inline TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &HandlerChainConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// JSON rendering of the configuration for diagnostics.
    pub fn debug_config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }

    /// Detect current environment from environment variables
    pub fn detect_environment() -> String {
        Self::resolve_environment(
            env::var("HANDLER_CHAIN_ENV").ok(),
            env::var("APP_ENV").ok(),
        )
    }

    fn resolve_environment(handler_chain_env: Option<String>, app_env: Option<String>) -> String {
        handler_chain_env
            .or(app_env)
            .unwrap_or_else(|| "development".to_string())
            .to_lowercase()
    }

    fn default_config_directory() -> PathBuf {
        env::var("HANDLER_CHAIN_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }

    /// `HANDLER_CHAIN__<SECTION>__<KEY>` overrides; `vars` replaces the process
    /// environment when given.
    fn environment_source(vars: Option<Map<String, String>>) -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(vars)
    }

    fn build(
        builder: ConfigBuilder<DefaultState>,
        source_name: &str,
    ) -> ConfigResult<HandlerChainConfig> {
        builder
            .build()
            .and_then(|config| config.try_deserialize::<HandlerChainConfig>())
            .map_err(|e| ConfigurationError::load_error(source_name, e))
    }

    fn finish(
        config: HandlerChainConfig,
        environment: &str,
        config_directory: PathBuf,
    ) -> ConfigResult<ConfigManager> {
        config.validate()?;

        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string_pretty(&config)
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );
        info!(
            environment = environment,
            cycle_guard = config.chain.cycle_guard,
            max_handlers = config.chain.max_handlers,
            approval_tiers = config.approval.tiers.len(),
            "Configuration loaded"
        );

        Ok(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        })
    }
}
