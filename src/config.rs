//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `GOPROJECT_*` environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Base used for absolute media URLs; the request's Host header when unset
    #[serde(default)]
    pub public_url: Option<String>,

    /// Largest accepted upload, in bytes
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:8084".to_string(),
        "http://127.0.0.1:8084".to_string(),
    ]
}

fn default_max_upload() -> usize {
    10 * 1024 * 1024 // 10 MB
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            public_url: None,
            max_upload_bytes: default_max_upload(),
        }
    }
}

/// Database and media locations
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Database file name, relative to `data_dir`
    #[serde(default = "default_database")]
    pub database: String,

    /// Upload directory, relative to `data_dir`
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("goproject").to_string_lossy().to_string())
        .unwrap_or_else(|| "./goproject_data".to_string())
}

fn default_database() -> String {
    "goproject.db".to_string()
}

fn default_media_dir() -> String {
    "media".to_string()
}

impl StorageConfig {
    /// Storage rooted at `data_dir` with default file names
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn database_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.database)
    }

    pub fn media_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.media_dir)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database: default_database(),
            media_dir: default_media_dir(),
        }
    }
}

/// Token signing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    #[serde(default = "default_issuer")]
    pub issuer: String,

    #[serde(default = "default_access_minutes")]
    pub access_token_minutes: i64,

    #[serde(default = "default_refresh_hours")]
    pub refresh_token_hours: i64,
}

pub(crate) const DEV_JWT_SECRET: &str = "goproject-development-secret-change-me";

fn default_jwt_secret() -> String {
    DEV_JWT_SECRET.to_string()
}

fn default_issuer() -> String {
    "goproject".to_string()
}

fn default_access_minutes() -> i64 {
    60
}

fn default_refresh_hours() -> i64 {
    24
}

impl AuthConfig {
    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            issuer: default_issuer(),
            access_token_minutes: default_access_minutes(),
            refresh_token_hours: default_refresh_hours(),
        }
    }
}

/// Terminal dashboard configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_session_file")]
    pub session_file: String,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_session_file() -> String {
    dirs::config_dir()
        .map(|p| p.join("goproject").join("session.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./goproject_session.json".to_string())
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            session_file: default_session_file(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "goproject=info,tower_http=debug".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("goproject").join("config.toml")),
            Some(PathBuf::from("/etc/goproject/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(host) = lookup("GOPROJECT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("GOPROJECT_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Some(url) = lookup("GOPROJECT_PUBLIC_URL") {
            self.server.public_url = Some(url);
        }

        // Storage overrides
        if let Some(data_dir) = lookup("GOPROJECT_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // Auth overrides
        if let Some(secret) = lookup("GOPROJECT_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        // Client overrides
        if let Some(url) = lookup("GOPROJECT_API_URL") {
            self.client.api_url = url;
        }
        if let Some(path) = lookup("GOPROJECT_SESSION_FILE") {
            self.client.session_file = path;
        }

        // Logging overrides
        if let Some(level) = lookup("GOPROJECT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("GOPROJECT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# GoProject Configuration
#
# Environment variables override these settings:
# - GOPROJECT_HOST
# - GOPROJECT_PORT
# - GOPROJECT_PUBLIC_URL
# - GOPROJECT_DATA_DIR
# - GOPROJECT_JWT_SECRET
# - GOPROJECT_API_URL
# - GOPROJECT_SESSION_FILE
# - GOPROJECT_LOG_LEVEL
# - GOPROJECT_LOG_FORMAT

[server]
# API server host
host = "127.0.0.1"

# API server port
port = 8000

# Allowed CORS origins (the web dashboard)
cors_origins = ["http://localhost:8084", "http://127.0.0.1:8084"]

# Base for absolute media URLs (defaults to the request Host header)
# public_url = "https://goproject.example.com"

# Largest accepted upload (bytes)
max_upload_bytes = 10485760

[storage]
# Directory holding the database and uploaded files
data_dir = "~/.local/share/goproject"

# SQLite database file, relative to data_dir
database = "goproject.db"

# Uploaded files, relative to data_dir
media_dir = "media"

[auth]
# HS256 signing secret; set a long random value in production
jwt_secret = "goproject-development-secret-change-me"

# Token issuer claim
issuer = "goproject"

# Access token lifetime (minutes)
access_token_minutes = 60

# Refresh token lifetime (hours)
refresh_token_hours = 24

[client]
# API base URL used by the terminal dashboard
api_url = "http://localhost:8000"

# Where the terminal dashboard keeps its tokens
# session_file = "~/.config/goproject/session.json"

[logging]
# Log filter (RUST_LOG syntax); RUST_LOG takes precedence
level = "goproject=info,tower_http=debug"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.auth.access_token_minutes, 60);
        assert_eq!(config.auth.refresh_token_hours, 24);
        assert!(config.auth.uses_development_secret());
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage.database, "goproject.db");
        assert_eq!(config.client.api_url, "http://localhost:8000");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9001\n[storage]\ndata_dir = \"/tmp/gp\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage.database_path(), PathBuf::from("/tmp/gp/goproject.db"));
        assert_eq!(config.storage.media_path(), PathBuf::from("/tmp/gp/media"));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("GOPROJECT_PORT", "9100"),
            ("GOPROJECT_JWT_SECRET", "s3cret"),
            ("GOPROJECT_API_URL", "http://api.test"),
            ("GOPROJECT_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert!(!config.auth.uses_development_secret());
        assert_eq!(config.client.api_url, "http://api.test");
        assert_eq!(config.logging.format, "json");
    }
}
