use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backends: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub views: ViewConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Base URLs of the REST backends this front end talks to.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Products backend (also serves categories, suppliers and reports)
    #[serde(default = "default_products_url")]
    pub products_url: String,
    #[serde(default = "default_services_url")]
    pub services_url: String,
    #[serde(default = "default_users_url")]
    pub users_url: String,
    /// Full URL of the upstream appointments listing
    #[serde(default = "default_appointments_url")]
    pub appointments_url: String,
    /// Per-request timeout in seconds. Unset means requests never time out.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            products_url: default_products_url(),
            services_url: default_services_url(),
            users_url: default_users_url(),
            appointments_url: default_appointments_url(),
            request_timeout_secs: None,
        }
    }
}

fn default_products_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_services_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_users_url() -> String {
    "http://localhost:5002".to_string()
}

fn default_appointments_url() -> String {
    "http://localhost:5003/getAllAppointments".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of the token and role cookies (default: 24 hours)
    #[serde(default = "default_session_ttl_hours")]
    pub ttl_hours: i64,
    /// Mark session cookies as Secure (enable behind HTTPS)
    #[serde(default)]
    pub secure_cookies: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_session_ttl_hours(),
            secure_cookies: false,
        }
    }
}

fn default_session_ttl_hours() -> i64 {
    24
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewConfig {
    /// Rows per page on every paginated table
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Product category whose products can be assigned to services
    #[serde(default = "default_service_product_category")]
    pub service_product_category_id: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            service_product_category_id: default_service_product_category(),
        }
    }
}

fn default_page_size() -> usize {
    5
}

fn default_service_product_category() -> String {
    "5".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| "Failed to parse configuration file")?;
            config.validate()?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            backends: BackendConfig::default(),
            session: SessionConfig::default(),
            views: ViewConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.views.page_size == 0 {
            anyhow::bail!("views.page_size must be at least 1");
        }
        if self.session.ttl_hours <= 0 {
            anyhow::bail!("session.ttl_hours must be positive");
        }
        Ok(())
    }
}
