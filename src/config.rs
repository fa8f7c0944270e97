use serde::Deserialize;
use crate::error::{RegistrationError, Result};

/// Environment variable carrying the store endpoint.
pub const URL_ENV: &str = "SUPABASE_URL";
/// Environment variable carrying the store credential.
pub const KEY_ENV: &str = "SUPABASE_KEY";

/// Top-level configuration loaded from an optional TOML file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Hosted store endpoint and layout.
    #[serde(default)]
    pub store: StoreConfig,
    /// Registration page settings.
    #[serde(default)]
    pub page: PageConfig,
}

/// HTTP server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted request body, in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port(), max_upload_mb: default_max_upload_mb() }
    }
}

/// Store endpoint, credential and object/table names.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Base URL of the hosted project. Overridden by `SUPABASE_URL`.
    #[serde(default)]
    pub url: Option<String>,
    /// API key. Overridden by `SUPABASE_KEY`.
    #[serde(default)]
    pub key: Option<String>,
    /// Bucket receiving player photos.
    #[serde(default = "default_photo_bucket")]
    pub photo_bucket: String,
    /// Table receiving one row per submission.
    #[serde(default = "default_inscriptions_table")]
    pub inscriptions_table: String,
    /// Table read by the ranking view.
    #[serde(default = "default_players_table")]
    pub players_table: String,
    /// Per-request timeout for store calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            photo_bucket: default_photo_bucket(),
            inscriptions_table: default_inscriptions_table(),
            players_table: default_players_table(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PageConfig {
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self { title: default_title() }
    }
}

/// Resolved endpoint + credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub url: String,
    pub key: String,
}

fn default_port() -> u16 { 8080 }
fn default_max_upload_mb() -> usize { 10 }
fn default_photo_bucket() -> String { "photos".into() }
fn default_inscriptions_table() -> String { "inscriptions".into() }
fn default_players_table() -> String { "players".into() }
fn default_timeout_secs() -> u64 { 30 }
fn default_title() -> String { "Inscripción Torneo".into() }

impl Config {
    /// Load configuration from a TOML file at `path`.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RegistrationError::Config(format!("Cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| RegistrationError::Config(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given (defaults otherwise), then overlay the
    /// process environment.
    pub fn load(path: Option<&std::path::Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Overlay store settings from `lookup`. Empty values count as absent.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.store.url = Some(url);
        }
        if let Some(key) = lookup(KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.store.key = Some(key);
        }
    }

    /// Both store settings, or `None` when either is missing.
    pub fn credentials(&self) -> Option<Credentials> {
        let url = self.store.url.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        let key = self.store.key.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        Some(Credentials {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    pub fn max_body_bytes(&self) -> usize {
        self.server.max_upload_mb.saturating_mul(1024 * 1024)
    }

    fn validate(&self) -> Result<()> {
        if self.server.max_upload_mb == 0 {
            return Err(RegistrationError::Config("max_upload_mb must be > 0".into()));
        }
        if self.server.max_upload_mb.checked_mul(1024 * 1024).is_none() {
            return Err(RegistrationError::Config("max_upload_mb is too large".into()));
        }
        if self.store.timeout_secs == 0 {
            return Err(RegistrationError::Config("timeout_secs must be > 0".into()));
        }
        for (field, value) in [
            ("photo_bucket", &self.store.photo_bucket),
            ("inscriptions_table", &self.store.inscriptions_table),
            ("players_table", &self.store.players_table),
        ] {
            if value.trim().is_empty() {
                return Err(RegistrationError::Config(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}
