use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins
    pub cors_origins: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Base URL of the external code-execution service
    #[serde(default = "default_exec_gateway_url")]
    pub exec_gateway_url: String,

    /// Timeout for execution requests, in seconds
    #[serde(default = "default_exec_gateway_timeout_secs")]
    pub exec_gateway_timeout_secs: u64,

    /// Maximum number of chat messages kept for replay (0 = unbounded)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Seconds of silence before a session is reclaimed (0 = never)
    #[serde(default = "default_session_idle_timeout_secs")]
    pub session_idle_timeout_secs: i64,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        // Load from environment variables using envy
        match envy::from_env::<Config>() {
            Ok(config) => {
                info!("✅ Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                error!("❌ Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.to_lowercase() == "dev" || self.environment.to_lowercase() == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            cors_origins: None,
            log_level: default_log_level(),
            exec_gateway_url: default_exec_gateway_url(),
            exec_gateway_timeout_secs: default_exec_gateway_timeout_secs(),
            history_limit: default_history_limit(),
            session_idle_timeout_secs: default_session_idle_timeout_secs(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "Environment variable error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_exec_gateway_url() -> String {
    "https://emkc.org/api/v2/piston".to_string()
}

fn default_exec_gateway_timeout_secs() -> u64 {
    10
}

fn default_history_limit() -> usize {
    1000
}

fn default_session_idle_timeout_secs() -> i64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.server_address(), "0.0.0.0:3000");
        assert!(config.is_development());
        assert_eq!(config.history_limit, 1000);
        assert_eq!(config.session_idle_timeout_secs, 300);
        assert_eq!(config.exec_gateway_timeout_secs, 10);
    }
}
