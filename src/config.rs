//! Haven Configuration
//!
//! Where the portal API lives, where the token is kept, how the sandbox
//! binds and how logs are written. Read from TOML, then `HAVEN_*`
//! environment variables win.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings for the client, the sandbox and logging
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub sandbox: SandboxConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Portal API client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix
    #[serde(default = "default_api_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Where the access token is kept between runs
    #[serde(default = "default_token_path")]
    pub token_path: String,
}

fn default_api_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_token_path() -> String {
    dirs::config_dir()
        .map(|p| p.join("haven").join("mh_token").to_string_lossy().to_string())
        .unwrap_or_else(|| "./.mh_token".to_string())
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
            token_path: default_token_path(),
        }
    }
}

/// Local sandbox API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SandboxConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "http://localhost:8080".to_string(),
    ]
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
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
    "info".to_string()
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

impl LoggingConfig {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` wins over the configured level.
    pub fn init(&self) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("haven={}", self.level)));

        let registry = tracing_subscriber::registry().with(filter);
        let result = if self.format.eq_ignore_ascii_case("json") {
            registry.with(tracing_subscriber::fmt::layer().json()).try_init()
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };

        if let Err(e) = result {
            eprintln!("Logging already initialised: {}", e);
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

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
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
            dirs::config_dir().map(|p| p.join("haven").join("config.toml")),
            Some(PathBuf::from("/etc/haven/config.toml")),
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

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("HAVEN_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(path) = std::env::var("HAVEN_TOKEN_PATH") {
            self.api.token_path = path;
        }

        if let Ok(host) = std::env::var("HAVEN_SANDBOX_HOST") {
            self.sandbox.host = host;
        }
        if let Ok(port) = std::env::var("HAVEN_SANDBOX_PORT") {
            if let Ok(p) = port.parse() {
                self.sandbox.port = p;
            }
        }

        if let Ok(level) = std::env::var("HAVEN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("HAVEN_LOG_FORMAT") {
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
    r#"# Haven Configuration
#
# Environment variables override these settings:
# - HAVEN_API_URL
# - HAVEN_TOKEN_PATH
# - HAVEN_SANDBOX_HOST
# - HAVEN_SANDBOX_PORT
# - HAVEN_LOG_LEVEL
# - HAVEN_LOG_FORMAT

[api]
# Portal API base URL (including the /api prefix)
base_url = "http://127.0.0.1:8000/api"

# Request timeout in seconds
request_timeout_secs = 30

# Access token file
# token_path = "~/.config/haven/mh_token"

[sandbox]
# Local sandbox API host
host = "127.0.0.1"

# Local sandbox API port
port = 8000

# Allowed CORS origins (the web client dev server)
cors_origins = ["http://localhost:5173", "http://127.0.0.1:5173", "http://localhost:8080"]

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_template_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.sandbox.port, 8000);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::parse("[api]\nbase_url = \"https://portal.example/api\"\n").unwrap();
        assert_eq!(config.api.base_url, "https://portal.example/api");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.sandbox.host, "127.0.0.1");
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sandbox]\nport = \"not a number\"\n").unwrap();

        match Config::load(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {:?}", other),
        }

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));
    }

    // The only test that touches HAVEN_* variables, so it cannot race another
    #[test]
    fn test_env_overrides() {
        let vars = [
            ("HAVEN_API_URL", "https://portal.example/api"),
            ("HAVEN_TOKEN_PATH", "/tmp/haven-token"),
            ("HAVEN_SANDBOX_HOST", "0.0.0.0"),
            ("HAVEN_SANDBOX_PORT", "9100"),
            ("HAVEN_LOG_LEVEL", "debug"),
            ("HAVEN_LOG_FORMAT", "json"),
        ];
        for (key, value) in vars {
            std::env::set_var(key, value);
        }

        let config = Config::from_env();
        assert_eq!(config.api.base_url, "https://portal.example/api");
        assert_eq!(config.api.token_path, "/tmp/haven-token");
        assert_eq!(config.sandbox.host, "0.0.0.0");
        assert_eq!(config.sandbox.port, 9100);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");

        // File values are overridden too; an unparsable port keeps the file's
        std::env::set_var("HAVEN_SANDBOX_PORT", "not-a-port");
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sandbox]\nport = 8123\n").unwrap();
        let config = Config::load_with_env(&path).unwrap();
        assert_eq!(config.sandbox.port, 8123);
        assert_eq!(config.sandbox.host, "0.0.0.0");

        for (key, _) in vars {
            std::env::remove_var(key);
        }
    }
}
