//! Configuration for the users service.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub links: LinksConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database URL, `sqlite:` prefix optional.
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Fallback filter when RUST_LOG is unset.
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

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated allowed origins, `*` for any.
    #[serde(default = "default_cors_origins")]
    pub origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_cors_origins(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Users must be strictly older than this many whole years.
    #[serde(default = "default_minimum_age")]
    pub minimum_age: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            minimum_age: default_minimum_age(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoutesConfig {
    /// Collection path; single users live at `{users_path}/:id`.
    #[serde(default = "default_users_path")]
    pub users_path: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            users_path: default_users_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LinksConfig {
    /// Prefix for every generated href, e.g. `https://api.example.com`.
    /// Empty means relative links.
    #[serde(default)]
    pub base_url: String,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_database_url() -> String {
    "sqlite:./data/users.db".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_cors_origins() -> String {
    "*".to_string()
}
fn default_minimum_age() -> u32 {
    18
}
fn default_users_path() -> String {
    "/users".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            cors: CorsConfig::default(),
            validation: ValidationConfig::default(),
            routes: RoutesConfig::default(),
            links: LinksConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (USERS__KEY or USERS__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Same as [`Config::load`] with an explicit config file name (extension optional).
    pub fn load_from(file_name: &str) -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name(file_name).required(false))
            .add_source(
                Environment::with_prefix("USERS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the router cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Items live under the collection, so it needs a segment of its own.
        if self.routes.users_path.trim_matches('/').is_empty() {
            return Err(ConfigError::Message(format!(
                "routes.users_path must name a non-root path, got '{}'",
                self.routes.users_path
            )));
        }
        Ok(())
    }

    /// Address the HTTP listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
