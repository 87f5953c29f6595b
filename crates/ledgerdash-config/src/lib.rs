//! Configuration management for ledgerdash
//!
//! This module handles loading, validation, and management of
//! ledgerdash configuration from YAML files.

pub mod error;
pub mod password;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};
pub use password::{hash_password, verify_password};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Minutes a login stays valid
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_ttl_minutes: default_session_ttl_minutes(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_session_ttl_minutes() -> u32 {
    12 * 60
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://ledgerdash.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

/// A login allowed to use the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Identifier every stored row is scoped by
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string, see `ledgerdash --hash-password`
    pub password_hash: String,
}

impl UserConfig {
    pub fn verify_password(&self, password: &str) -> bool {
        crate::password::verify_password(password, &self.password_hash)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
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

/// Time range enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// Current month
    Month,
    /// Current calendar quarter
    Quarter,
    /// Current year
    Year,
    /// All time
    #[default]
    All,
}

impl std::str::FromStr for TimeRange {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month" => Ok(TimeRange::Month),
            "quarter" => Ok(TimeRange::Quarter),
            "year" => Ok(TimeRange::Year),
            "all" => Ok(TimeRange::All),
            _ => Err(format!("Invalid time range: {}", s)),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeRange::Month => write!(f, "month"),
            TimeRange::Quarter => write!(f, "quarter"),
            TimeRange::Year => write!(f, "year"),
            TimeRange::All => write!(f, "all"),
        }
    }
}

/// Order of the dashboard sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DashboardLayout {
    /// Entry forms, recent tables, then charts; categories live in a settings panel
    #[default]
    Classic,
    /// Charts above the entry forms
    ChartsFirst,
    /// Date filter bar, forms, inline category form, tables, charts
    Filtered,
}

impl DashboardLayout {
    /// Whether the from/to filter bar is shown unless overridden
    pub fn shows_date_filter(&self) -> bool {
        matches!(self, DashboardLayout::Filtered)
    }

    pub fn charts_first(&self) -> bool {
        matches!(self, DashboardLayout::ChartsFirst)
    }

    /// Whether the category form renders inline instead of in the settings panel
    pub fn inline_category_form(&self) -> bool {
        matches!(self, DashboardLayout::Filtered)
    }
}

impl std::str::FromStr for DashboardLayout {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(DashboardLayout::Classic),
            "charts_first" => Ok(DashboardLayout::ChartsFirst),
            "filtered" => Ok(DashboardLayout::Filtered),
            _ => Err(format!("Invalid dashboard layout: {}", s)),
        }
    }
}

impl std::fmt::Display for DashboardLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardLayout::Classic => write!(f, "classic"),
            DashboardLayout::ChartsFirst => write!(f, "charts_first"),
            DashboardLayout::Filtered => write!(f, "filtered"),
        }
    }
}

/// How a category without its own icon is decorated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IconFallback {
    /// One default icon per variant
    #[default]
    Variant,
    /// Look up well-known category names first
    ByName,
}

/// Dashboard display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub layout: DashboardLayout,
    /// Overrides the layout's filter bar choice
    #[serde(default)]
    pub show_date_filter: Option<bool>,
    /// Rows per recent income/expense table
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default)]
    pub icon_fallback: IconFallback,
    /// Range applied when the request carries no from/to
    #[serde(default)]
    pub default_range: TimeRange,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            layout: DashboardLayout::default(),
            show_date_filter: None,
            recent_limit: default_recent_limit(),
            icon_fallback: IconFallback::default(),
            default_range: TimeRange::default(),
        }
    }
}

impl DashboardConfig {
    pub fn date_filter_enabled(&self) -> bool {
        self.show_date_filter
            .unwrap_or_else(|| self.layout.shows_date_filter())
    }
}

fn default_recent_limit() -> usize {
    10
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Symbol printed before amounts
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            decimal_places: default_decimal_places(),
            thousands_separator: default_thousands_sep(),
        }
    }
}

fn default_symbol() -> String {
    "£".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_thousands_sep() -> String {
    ",".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Accounts allowed to sign in
    #[serde(default)]
    pub users: Vec<UserConfig>,
    /// Dashboard display settings
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            users: Vec::new(),
            dashboard: DashboardConfig::default(),
            currency: CurrencyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|_| ConfigError::IoError)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            reason: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.server.session_ttl_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.session_ttl_minutes".to_string(),
                reason: "Sessions must last at least one minute".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.max_connections".to_string(),
                reason: "At least one connection is required".to_string(),
            });
        }

        if self.dashboard.recent_limit == 0 || self.dashboard.recent_limit > 100 {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.recent_limit".to_string(),
                reason: "Recent limit must be between 1 and 100".to_string(),
            });
        }

        if self.currency.decimal_places > 6 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 6".to_string(),
            });
        }

        if self.users.is_empty() {
            return Err(ConfigError::MissingField {
                field: "users".to_string(),
            });
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for user in &self.users {
            if user.username.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: format!("User {} has an empty username", user.id),
                });
            }
            if !ids.insert(user.id) {
                return Err(ConfigError::ValidationError {
                    message: format!("Duplicate user id: {}", user.id),
                });
            }
            if !names.insert(user.username.as_str()) {
                return Err(ConfigError::ValidationError {
                    message: format!("Duplicate username: {}", user.username),
                });
            }
            if let Some(reason) = password::check_hash(&user.password_hash) {
                return Err(ConfigError::InvalidValue {
                    field: format!("users.{}.password_hash", user.username),
                    reason: format!("Not an argon2 PHC string ({})", reason),
                });
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Find the configured user matching a login attempt
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&UserConfig> {
        self.users
            .iter()
            .find(|u| u.username == username)
            .filter(|u| u.verify_password(password))
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ==================== Tests ====================
