use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    /// Identity provider token verification
    pub identity: IdentityConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub membership: MembershipConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// RSA public key of the identity provider in PEM format
    pub public_key: String,

    /// Expected `iss` claim; not checked when empty
    #[serde(default)]
    pub issuer: String,

    /// Leeway in seconds for clock skew tolerance (default: 30)
    #[serde(default = "default_identity_leeway")]
    pub leeway_secs: u64,
}

/// Platform admin allow-list bootstrap.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Emails granted platform admin rights at startup
    #[serde(default)]
    pub seed_emails: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MembershipConfig {
    /// Whether a user whose request was denied may ask again
    #[serde(default)]
    pub allow_re_request_after_denial: bool,

    /// Attempts for an approval that hits a serialization failure or deadlock
    #[serde(default = "default_approval_max_attempts")]
    pub approval_max_attempts: u32,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            allow_re_request_after_denial: false,
            approval_max_attempts: default_approval_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Hours a member has to confirm access data
    #[serde(default = "default_confirmation_deadline_hours")]
    pub confirmation_deadline_hours: u32,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            confirmation_deadline_hours: default_confirmation_deadline_hours(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_identity_leeway() -> u64 {
    shared::jwt::DEFAULT_LEEWAY_SECS
}
fn default_approval_max_attempts() -> u32 {
    3
}
fn default_confirmation_deadline_hours() -> u32 {
    48
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with L2S__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("L2S")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins")
                    .with_list_parse_key("admin.seed_emails")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds from embedded defaults so tests do not depend on the working
    /// directory.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []

            [identity]
            public_key = "test-public-key"
            issuer = ""
            leeway_secs = 30

            [admin]
            seed_emails = []

            [membership]
            allow_re_request_after_denial = false
            approval_max_attempts = 3

            [delivery]
            confirmation_deadline_hours = 48
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "L2S__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.identity.public_key.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "L2S__IDENTITY__PUBLIC_KEY environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.membership.approval_max_attempts == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "membership.approval_max_attempts must be at least 1".to_string(),
            ));
        }

        if self.delivery.confirmation_deadline_hours == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "delivery.confirmation_deadline_hours must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Expected token issuer, if one is configured.
    pub fn identity_issuer(&self) -> Option<&str> {
        Some(self.identity.issuer.trim()).filter(|i| !i.is_empty())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
