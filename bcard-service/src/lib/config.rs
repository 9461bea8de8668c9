use std::env;

use auth::LockoutPolicy;
use auth::PasswordHasher;
use auth::TokenIssuer;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageBackend,
    /// Name of the run mode, reported by the health endpoint.
    pub environment: String,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,
    #[serde(default = "default_lock_hours")]
    pub lock_hours: u32,
    pub token_secret: String,
    #[serde(default = "default_token_expiry")]
    pub token_expiry: String,
}

fn default_max_connections() -> u32 {
    5
}

fn default_http_port() -> u16 {
    3001
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_hash_cost() -> u32 {
    PasswordHasher::DEFAULT_COST
}

fn default_max_login_attempts() -> u32 {
    LockoutPolicy::DEFAULT_MAX_ATTEMPTS
}

fn default_lock_hours() -> u32 {
    LockoutPolicy::DEFAULT_LOCK_HOURS
}

fn default_token_expiry() -> String {
    "7d".to_string()
}

impl AuthConfig {
    pub fn password_hasher(&self) -> Result<PasswordHasher, ConfigError> {
        PasswordHasher::with_cost(self.hash_cost)
            .map_err(|e| ConfigError::Message(format!("auth.hash_cost: {}", e)))
    }

    pub fn lockout_policy(&self) -> Result<LockoutPolicy, ConfigError> {
        LockoutPolicy::new(self.max_login_attempts, self.lock_hours)
            .map_err(|e| ConfigError::Message(format!("auth lockout settings: {}", e)))
    }

    pub fn token_issuer(&self) -> Result<TokenIssuer, ConfigError> {
        if self.token_secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "auth.token_secret must be set (AUTH__TOKEN_SECRET)".to_string(),
            ));
        }

        let lifetime = auth::parse_lifetime(&self.token_expiry)
            .map_err(|e| ConfigError::Message(format!("auth.token_expiry: {}", e)))?;

        TokenIssuer::new(self.token_secret.as_bytes(), lifetime)
            .map_err(|e| ConfigError::Message(format!("auth.token_expiry: {}", e)))
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH__TOKEN_SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("environment", run_mode.as_str())?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(
                Environment::with_prefix("")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.password_hasher()?;
        self.auth.lockout_policy()?;
        self.auth.token_issuer()?;

        if self.storage == StorageBackend::Postgres && self.database.url.trim().is_empty() {
            return Err(ConfigError::Message(
                "database.url must be set when storage is postgres".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Result<Config, ConfigError> {
        ConfigBuilder::builder()
            .set_default("environment", "test")?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_defaults_apply() {
        let config = parse(
            r#"
            storage = "memory"

            [auth]
            token_secret = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.http_port, 3001);
        assert_eq!(config.server.allowed_origins.len(), 4);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.auth.hash_cost, 12);
        assert_eq!(config.auth.max_login_attempts, 3);
        assert_eq!(config.auth.lock_hours, 24);
        assert_eq!(config.auth.token_expiry, "7d");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.environment, "test");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let config = parse(
            r#"
            storage = "memory"

            [auth]
            token_secret = "  "
            "#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_auth_numbers_are_rejected() {
        for auth in [
            "max_login_attempts = 0",
            "lock_hours = 0",
            "hash_cost = 0",
            "token_expiry = \"soon\"",
            "token_expiry = \"0d\"",
        ] {
            let config = parse(&format!(
                "storage = \"memory\"\n[auth]\ntoken_secret = \"secret\"\n{auth}\n"
            ))
            .unwrap();
            assert!(config.validate().is_err(), "{auth} should be rejected");
        }
    }

    #[test]
    fn test_postgres_requires_url() {
        let config = parse(
            r#"
            [auth]
            token_secret = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage, StorageBackend::Postgres);
        assert!(config.validate().is_err());
    }
}
