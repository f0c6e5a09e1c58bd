//! Configuration loading and data folder resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`CXPERIA_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment handling lives in the server binary (clap);
//! this module owns the TOML layer and the defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the data folder
pub const DATA_FOLDER_ENV: &str = "CXPERIA_DATA_FOLDER";

/// Environment variable naming an explicit config file
pub const CONFIG_FILE_ENV: &str = "CXPERIA_CONFIG";

/// Database file name inside the data folder
pub const DATABASE_FILE: &str = "cxperia.db";

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Longest accepted scan dedup window (one week)
pub const MAX_SCAN_DEDUP_MINUTES: u64 = 7 * 24 * 60;

/// Transactional email provider settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmailConfig {
    /// HTTP endpoint accepting `{from, to, subject, html}` JSON
    pub api_url: String,
    /// Bearer key for the provider; email is disabled when unset
    pub api_key: Option<String>,
    /// Sender address
    pub from: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.resend.com/emails".to_string(),
            api_key: None,
            from: "Cxperia <no-reply@cxperia.com>".to_string(),
        }
    }
}

/// Server configuration as read from TOML
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: String,
    /// Folder holding the SQLite database
    pub data_folder: Option<PathBuf>,
    /// Base URL of the public experience viewer (used in QR codes)
    pub public_base_url: String,
    /// Session lifetime
    pub session_ttl_hours: i64,
    /// Public read cache lifetime
    pub cache_ttl_secs: u64,
    /// Public read cache capacity (entries)
    pub cache_max_entries: u64,
    /// Window in which repeat scans from one visitor are not counted
    pub scan_dedup_minutes: u64,
    /// Mark session cookies `Secure`
    pub cookie_secure: bool,
    /// Browser origins allowed to call the API with credentials; empty allows
    /// any origin without credentials
    pub allowed_origins: Vec<String>,
    /// Email provider
    pub email: EmailConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5800".to_string(),
            data_folder: None,
            public_base_url: "http://localhost:3000".to_string(),
            session_ttl_hours: 168,
            cache_ttl_secs: 300,
            cache_max_entries: 10_000,
            scan_dedup_minutes: 30,
            cookie_secure: false,
            allowed_origins: Vec::new(),
            email: EmailConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values outside the ranges the server can represent
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
            return Err(Error::Config(format!(
                "session_ttl_hours must be between 1 and {}, got {}",
                MAX_SESSION_TTL_HOURS, self.session_ttl_hours
            )));
        }
        if self.scan_dedup_minutes > MAX_SCAN_DEDUP_MINUTES {
            return Err(Error::Config(format!(
                "scan_dedup_minutes must be at most {}, got {}",
                MAX_SCAN_DEDUP_MINUTES, self.scan_dedup_minutes
            )));
        }
        Ok(())
    }

    /// Load configuration from the first config file found, or defaults
    ///
    /// A missing or unreadable file is not fatal: a warning is logged and
    /// compiled defaults are used.
    pub fn load(explicit_path: Option<&Path>) -> Self {
        let path = match explicit_path.map(Path::to_path_buf).or_else(find_config_file) {
            Some(path) => path,
            None => {
                info!("No config file found, using compiled defaults");
                return Self::default();
            }
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(config) => {
                    info!("Loaded config file: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Could not read config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Strip any trailing slash so URLs can be joined with `/`
    pub fn public_base_url(&self) -> &str {
        self.public_base_url.trim_end_matches('/')
    }
}

/// Data folder resolution: CLI argument, then environment, then TOML, then default
pub fn resolve_data_folder(cli_arg: Option<&Path>, config: &ServerConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.data_folder {
        return path.clone();
    }

    default_data_folder()
}

/// Locate a config file for the platform
fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("cxperia").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/cxperia/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("cxperia"))
        .unwrap_or_else(|| PathBuf::from("./cxperia_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.session_ttl_hours, 168);
        assert_eq!(config.scan_dedup_minutes, 30);
        assert!(config.email.api_key.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml_str(
            r#"
            public_base_url = "https://exp.example.com/"
            cache_ttl_secs = 60

            [email]
            api_key = "re_123"
            "#,
        )
        .unwrap();

        assert_eq!(config.public_base_url(), "https://exp.example.com");
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.email.api_key.as_deref(), Some("re_123"));
        assert_eq!(config.email.from, EmailConfig::default().from);
        assert_eq!(config.bind_addr, "127.0.0.1:5800");
    }

    #[test]
    fn test_out_of_range_durations_rejected() {
        for toml in [
            "session_ttl_hours = 0",
            "session_ttl_hours = -5",
            "session_ttl_hours = 9223372036854775807",
            "scan_dedup_minutes = 9223372036854775807",
        ] {
            let err = ServerConfig::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "accepted {}", toml);
        }

        let config = ServerConfig::from_toml_str("session_ttl_hours = 8760").unwrap();
        assert_eq!(config.session_ttl_hours, MAX_SESSION_TTL_HOURS);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ServerConfig::from_toml_str("session_ttl_hours = \"soon\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
