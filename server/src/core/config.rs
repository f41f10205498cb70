use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::catalog::SearchSettings;
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PAGE_SIZE, DEFAULT_PORT,
    DEFAULT_TOP_RATED_LIMIT, MAX_PAGE_SIZE, MAX_TOP_RATED_LIMIT,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Catalog configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CatalogFileConfig {
    pub page_size: Option<u32>,
    pub max_page_size: Option<u32>,
    pub top_rated_limit: Option<u32>,
}

/// PayPal configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PaypalFileConfig {
    pub client_id: Option<String>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub catalog: Option<CatalogFileConfig>,
    pub paypal: Option<PaypalFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(catalog) = other.catalog {
            let current = self.catalog.get_or_insert_with(CatalogFileConfig::default);
            if catalog.page_size.is_some() {
                current.page_size = catalog.page_size;
            }
            if catalog.max_page_size.is_some() {
                current.max_page_size = catalog.max_page_size;
            }
            if catalog.top_rated_limit.is_some() {
                current.top_rated_limit = catalog.top_rated_limit;
            }
        }

        if let Some(paypal) = other.paypal {
            let current = self.paypal.get_or_insert_with(PaypalFileConfig::default);
            if paypal.client_id.is_some() {
                current.client_id = paypal.client_id;
            }
        }

        if other.debug.is_some() {
            self.debug = other.debug;
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Catalog paging configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogConfig {
    pub page_size: u32,
    pub max_page_size: u32,
    pub top_rated_limit: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            top_rated_limit: DEFAULT_TOP_RATED_LIMIT,
        }
    }
}

impl CatalogConfig {
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            default_limit: self.page_size,
            max_limit: self.max_page_size,
        }
    }
}

/// PayPal configuration
#[derive(Debug, Clone, Default)]
pub struct PaypalConfig {
    pub client_id: Option<String>,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub paypal: PaypalConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.storefront/storefront.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(cli, file_config);
        config.validate()?;
        tracing::debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_catalog = file_config.catalog.unwrap_or_default();
        let file_paypal = file_config.paypal.unwrap_or_default();
        let defaults = CatalogConfig::default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let catalog = CatalogConfig {
            page_size: cli
                .page_size
                .or(file_catalog.page_size)
                .unwrap_or(defaults.page_size),
            max_page_size: cli
                .max_page_size
                .or(file_catalog.max_page_size)
                .unwrap_or(defaults.max_page_size),
            top_rated_limit: file_catalog
                .top_rated_limit
                .unwrap_or(defaults.top_rated_limit),
        };

        let client_id = cli
            .paypal_client_id
            .clone()
            .or(file_paypal.client_id)
            .filter(|id| !id.trim().is_empty());

        // --debug on the CLI only ever enables debug mode
        let debug = cli.debug || file_config.debug.unwrap_or(false);

        Self {
            server: ServerConfig { host, port },
            catalog,
            paypal: PaypalConfig { client_id },
            debug,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }
        if self.catalog.page_size == 0 {
            anyhow::bail!("Configuration error: catalog.page_size must be greater than 0");
        }
        if self.catalog.page_size > self.catalog.max_page_size {
            anyhow::bail!(
                "Configuration error: catalog.page_size ({}) must not exceed catalog.max_page_size ({})",
                self.catalog.page_size,
                self.catalog.max_page_size
            );
        }
        if self.catalog.top_rated_limit == 0 || self.catalog.top_rated_limit > MAX_TOP_RATED_LIMIT
        {
            anyhow::bail!(
                "Configuration error: catalog.top_rated_limit must be between 1 and {}",
                MAX_TOP_RATED_LIMIT
            );
        }
        Ok(())
    }
}

/// Get the profile config path (~/.storefront/storefront.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
