use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating configuration. All of them are
/// fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(&'static str),

    #[error("invalid database url: {0}")]
    DatabaseUrl(#[from] url::ParseError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Shared HMAC key used to verify bearer tokens
    #[serde(rename = "signkey", alias = "sign_key")]
    pub sign_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    /// Drop, recreate and seed all tables on startup
    pub reset_schema: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8000,
            jwt: JwtConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            username: String::new(),
            password: String::new(),
            database: String::new(),
            max_connections: 10,
            connect_timeout_secs: 5,
            reset_schema: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional YAML file, then apply `APPMAN_*`
    /// environment overrides and validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let config = base.with_env_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Apply overrides from a variable lookup. Taking the lookup as a closure
    /// keeps tests away from the process environment.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(v) = lookup("APPMAN_HOST") {
            self.host = v;
        }
        if let Some(v) = lookup("APPMAN_PORT") {
            self.port = parse_env("APPMAN_PORT", v)?;
        }
        if let Some(v) = lookup("APPMAN_JWT_SIGNKEY") {
            self.jwt.sign_key = v;
        }

        // Database overrides
        if let Some(v) = lookup("APPMAN_DATABASE_HOST") {
            self.database.host = v;
        }
        if let Some(v) = lookup("APPMAN_DATABASE_PORT") {
            self.database.port = parse_env("APPMAN_DATABASE_PORT", v)?;
        }
        if let Some(v) = lookup("APPMAN_DATABASE_USERNAME") {
            self.database.username = v;
        }
        if let Some(v) = lookup("APPMAN_DATABASE_PASSWORD") {
            self.database.password = v;
        }
        if let Some(v) = lookup("APPMAN_DATABASE_NAME") {
            self.database.database = v;
        }
        if let Some(v) = lookup("APPMAN_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_env("APPMAN_DATABASE_MAX_CONNECTIONS", v)?;
        }
        if let Some(v) = lookup("APPMAN_DATABASE_CONNECT_TIMEOUT") {
            self.database.connect_timeout_secs = parse_env("APPMAN_DATABASE_CONNECT_TIMEOUT", v)?;
        }
        if let Some(v) = lookup("APPMAN_DATABASE_RESET_SCHEMA") {
            self.database.reset_schema = parse_env("APPMAN_DATABASE_RESET_SCHEMA", v)?;
        }

        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty"));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must not be 0"));
        }
        if self.jwt.sign_key.is_empty() {
            return Err(ConfigError::Invalid("jwt signing key must not be empty"));
        }
        if self.database.host.trim().is_empty() {
            return Err(ConfigError::Invalid("database host must not be empty"));
        }
        if self.database.database.trim().is_empty() {
            return Err(ConfigError::Invalid("database name must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database max_connections must be at least 1"));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    /// Postgres connection URL with percent-encoded credentials
    pub fn connection_string(&self) -> Result<String, ConfigError> {
        let mut url = url::Url::parse(&format!("postgres://{}:{}", self.host, self.port))?;
        url.set_path(&format!("/{}", self.database));

        if !self.username.is_empty() {
            url.set_username(&self.username)
                .map_err(|_| ConfigError::Invalid("database username cannot be used in a url"))?;
        }
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| ConfigError::Invalid("database password cannot be used in a url"))?;
        }

        Ok(url.into())
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}
