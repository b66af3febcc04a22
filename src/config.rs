use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::UserRole;
use crate::session::SessionSecurityConfig;

/// A config-provisioned user account (bcrypt password hash, never a
/// plaintext password)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigUser {
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Session security parameters
    #[serde(default)]
    pub session: SessionSecurityConfig,
    /// Address the server listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Provisioned user accounts
    #[serde(default)]
    pub users: Vec<ConfigUser>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionSecurityConfig::default(),
            bind_addr: default_bind_addr(),
            users: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.session.validate()?;

        let mut seen = HashSet::new();
        for user in &self.users {
            if user.username.is_empty() {
                return Err("Configured user has an empty username".to_string());
            }
            if !seen.insert(user.username.as_str()) {
                return Err(format!("Duplicate username in config: {}", user.username));
            }
        }

        Ok(())
    }
}

/// Load configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Arc<AppConfig>, String> {
    let path = path.as_ref();
    info!("Loading configuration from: {}", path.display());

    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

    let config: AppConfig = serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse YAML config: {}", e))?;

    config.validate()?;

    info!(
        "Configuration loaded: session lifetime {}s, rotation interval {}s, {} user(s)",
        config.session.session_lifetime_secs,
        config.session.rotation_interval_secs,
        config.users.len()
    );

    Ok(Arc::new(config))
}

/// Load configuration with fallback options
pub fn load_config_with_fallback() -> Result<Arc<AppConfig>, String> {
    // Try loading from environment variable first
    if let Ok(config_path) = std::env::var("CONFIG_PATH") {
        match load_config(&config_path) {
            Ok(config) => return Ok(config),
            Err(e) => warn!(
                "Failed to load config from CONFIG_PATH ({}): {}",
                config_path, e
            ),
        }
    }

    // Try common config file locations
    let paths = vec!["config.yaml", "config.yml", "./config.yaml", "./config.yml"];

    for path in paths {
        if Path::new(path).exists() {
            match load_config(path) {
                Ok(config) => return Ok(config),
                Err(e) => warn!("Failed to load config from '{}': {}", path, e),
            }
        }
    }

    Err(
        "No configuration file found. Create a config.yaml or set the CONFIG_PATH \
        environment variable. See config.example.yaml for an example."
            .to_string(),
    )
}
