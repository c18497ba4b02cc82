//! Application configuration.
//!
//! Read from a JSON file (path in `MYTRENO_CONFIG`, default `mytreno.json`):
//!
//! ```json
//! {
//!   "version": 2,
//!   "listen": "127.0.0.1:3000",
//!   "entries": [
//!     { "mode": "station", "station_id": "S08409", "station_name": "Roma Termini" },
//!     { "mode": "train", "train_number": "9650" }
//!   ]
//! }
//! ```
//!
//! Version 1 files predate train entries: their entries carry only
//! `station_id`/`station_name` and are migrated on load.

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::registry::validate_train_number;
use crate::viaggiatreno::{
    BoardStatusPolicy, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, ViaggiaTrenoConfig,
};

/// Config file format written by current versions.
pub const CURRENT_VERSION: u64 = 2;

/// Default HTTP listen address.
pub const DEFAULT_LISTEN: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported config version {0} (newest known is {max})", max = CURRENT_VERSION)]
    UnsupportedVersion(u64),

    #[error("entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error("invalid listen address '{0}'")]
    InvalidListen(String),
}

/// A configured sensor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Entry {
    /// Departure/arrival board for a station.
    #[serde(alias = "stazione")]
    Station {
        station_id: String,
        #[serde(default)]
        station_name: Option<String>,
    },
    /// A fixed train to follow.
    #[serde(alias = "treno")]
    Train { train_number: String },
}

impl Entry {
    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        match self {
            Entry::Station { station_id, .. } if station_id.trim().is_empty() => {
                Err(ConfigError::InvalidEntry {
                    index,
                    reason: "empty station_id".to_string(),
                })
            }
            Entry::Train { train_number } => validate_train_number(train_number)
                .map(|_| ())
                .map_err(|e| ConfigError::InvalidEntry {
                    index,
                    reason: e.to_string(),
                }),
            _ => Ok(()),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    #[serde(default = "current_version")]
    pub version: u64,

    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub board_status_policy: BoardStatusPolicy,

    #[serde(default)]
    pub entries: Vec<Entry>,
}

fn current_version() -> u64 {
    CURRENT_VERSION
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(DEFAULT_LISTEN)
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            listen: default_listen(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            board_status_policy: BoardStatusPolicy::default(),
            entries: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a config document, migrating old versions.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let mut value: Value = serde_json::from_str(text)?;
        migrate(&mut value)?;

        let config: AppConfig = serde_json::from_value(value)?;
        for (index, entry) in config.entries.iter().enumerate() {
            entry.validate(index)?;
        }
        Ok(config)
    }

    /// Load from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Load from a file, falling back to defaults if it does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Apply `MYTRENO_LISTEN` and `MYTRENO_BASE_URL` from `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(listen) = lookup("MYTRENO_LISTEN") {
            self.listen = listen
                .parse()
                .map_err(|_| ConfigError::InvalidListen(listen.clone()))?;
        }
        if let Some(base_url) = lookup("MYTRENO_BASE_URL") {
            self.base_url = base_url;
        }
        Ok(self)
    }

    /// Upstream client settings.
    pub fn client_config(&self) -> ViaggiaTrenoConfig {
        ViaggiaTrenoConfig::new()
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout_secs)
            .with_status_policy(self.board_status_policy)
    }
}

/// Bring a raw config document up to [`CURRENT_VERSION`].
fn migrate(value: &mut Value) -> Result<(), ConfigError> {
    let version = value.get("version").and_then(Value::as_u64).unwrap_or(1);

    if version > CURRENT_VERSION {
        return Err(ConfigError::UnsupportedVersion(version));
    }

    if version < 2 {
        if let Some(entries) = value.get_mut("entries").and_then(Value::as_array_mut) {
            for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
                if !entry.contains_key("mode") {
                    entry.insert("mode".to_string(), Value::from("station"));
                }
            }
        }
        info!(from = version, to = CURRENT_VERSION, "Migrated config");
    }

    if let Some(object) = value.as_object_mut() {
        object.insert("version".to_string(), Value::from(CURRENT_VERSION));
    }
    Ok(())
}
