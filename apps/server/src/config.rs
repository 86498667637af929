//! Server configuration module.
//!
//! Configuration is read from a TOML file, then environment overrides are
//! applied, then the result is validated.
//!
//! ## Load Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. $VAPE_CONFIG, else <platform config dir>/config.toml               │
//! │     (missing file → all defaults)                                       │
//! │  2. Environment overrides (VAPE_PORT, TELEGRAM_BOT_TOKEN, ...)          │
//! │  3. validate()                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Offset, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use vape_core::Role;

/// Minimum JWT secret length in bytes.
const MIN_SECRET_LEN: usize = 16;

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub database: DatabaseConfig,
    pub telegram: TelegramConfig,
    pub auth: AuthConfig,
    pub inventory: InventoryConfig,
    pub images: ImagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Shop-local offset from UTC; used for the daily-sales date and the
    /// time printed in sale summaries.
    pub timezone_offset_minutes: i32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            timezone_offset_minutes: 180,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file; defaults to the platform data dir.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        TelegramConfig {
            bot_token: None,
            chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Token lifetime in seconds (default: 12 hours)
    pub token_lifetime_secs: i64,
    pub users: Vec<UserEntry>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            jwt_secret: String::new(),
            token_lifetime_secs: 43_200,
            users: Vec::new(),
        }
    }
}

/// One allowed user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    pub email: String,
    /// Argon2 PHC string, see the `hash-password` binary.
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// How many times an arrival polls for the written brand.
    pub visibility_attempts: u32,
    pub visibility_delay_ms: u64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        InventoryConfig {
            visibility_attempts: 5,
            visibility_delay_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub dir: PathBuf,
    pub public_base_url: String,
    pub max_upload_bytes: usize,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        ImagesConfig {
            dir: PathBuf::from("images"),
            public_base_url: "/images".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = match env::var("VAPE_CONFIG") {
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => project_dirs().map(|dirs| dirs.config_dir().join("config.toml")),
        };

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(path = %path.display(), "No config file, using defaults");
                ServerConfig::default()
            }
            None => ServerConfig::default(),
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Applies environment overrides through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("VAPE_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(port) = lookup("VAPE_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue("VAPE_PORT".to_string()))?;
        }
        if let Some(path) = lookup("VAPE_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat_id) = lookup("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = Some(chat_id);
        }
        if let Some(base) = lookup("TELEGRAM_API_BASE") {
            self.telegram.api_base = base;
        }
        if let Some(secret) = lookup("VAPE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(dir) = lookup("VAPE_IMAGES_DIR") {
            self.images.dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Rejects configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("auth.jwt_secret".to_string()));
        }
        if self.auth.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue(format!(
                "auth.jwt_secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if self.auth.token_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("auth.token_lifetime_secs".to_string()));
        }
        if self.auth.users.is_empty() {
            return Err(ConfigError::MissingRequired("auth.users".to_string()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue("server.port".to_string()));
        }
        if self.server.timezone_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::InvalidValue("server.timezone_offset_minutes".to_string()));
        }
        if self.inventory.visibility_attempts == 0 {
            return Err(ConfigError::InvalidValue("inventory.visibility_attempts".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue("database.max_connections".to_string()));
        }
        Ok(())
    }

    /// Address the HTTP listener binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.bind_addr, self.server.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("server.bind_addr".to_string()))
    }

    /// Shop-local time zone.
    pub fn timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.server.timezone_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Configured database path, or `<platform data dir>/vape.db`.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ConfigError::NoProjectDirs)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;
        Ok(data_dir.join("vape.db"))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "vape", "pos")
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Could not determine platform directories")]
    NoProjectDirs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
        [server]
        port = 9000
        timezone_offset_minutes = 120

        [telegram]
        bot_token = "123:abc"
        chat_id = "-100500"

        [auth]
        jwt_secret = "0123456789abcdef0123"

        [[auth.users]]
        email = "owner@shop.ua"
        password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"
        role = "admin"

        [[auth.users]]
        email = "seller@shop.ua"
        password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"
        role = "seller"
    "#;

    #[test]
    fn test_parse_with_defaults() {
        let config = ServerConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
        assert_eq!(config.auth.users.len(), 2);
        assert_eq!(config.auth.users[1].role, Role::Seller);
        assert_eq!(config.inventory.visibility_attempts, 5);
        assert_eq!(config.images.public_base_url, "/images");
        assert!(config.validate().is_ok());
        assert_eq!(config.timezone().local_minus_utc(), 7200);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::from_toml_str(SAMPLE).unwrap();
        let env: HashMap<&str, &str> = [
            ("VAPE_PORT", "8181"),
            ("TELEGRAM_CHAT_ID", "-42"),
            ("VAPE_DB_PATH", "/tmp/shop.db"),
        ]
        .into_iter()
        .collect();

        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 8181);
        assert_eq!(config.telegram.chat_id.as_deref(), Some("-42"));
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/shop.db"));
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = ServerConfig::from_toml_str(SAMPLE).unwrap();
        let result = config.apply_overrides(|key| (key == "VAPE_PORT").then(|| "http".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = ServerConfig::from_toml_str(SAMPLE).unwrap();
        config.auth.jwt_secret = "short".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        let mut config = ServerConfig::from_toml_str(SAMPLE).unwrap();
        config.auth.users.clear();
        assert!(matches!(config.validate(), Err(ConfigError::MissingRequired(_))));

        let mut config = ServerConfig::from_toml_str(SAMPLE).unwrap();
        config.inventory.visibility_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let text = SAMPLE.replace("role = \"seller\"", "role = \"cashier\"");
        assert!(matches!(ServerConfig::from_toml_str(&text), Err(ConfigError::Parse(_))));
    }
}
