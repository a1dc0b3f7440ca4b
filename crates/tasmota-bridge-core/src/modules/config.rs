//! Configuration persistence.
//!
//! The bridge config is a single JSON document. Writes go to a temp file
//! first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use tasmota_bridge_types::{BridgeConfig, ConfigError};

const CONFIG_FILE: &str = "tasmota_bridge.json";
const DATA_DIR: &str = ".tasmota_bridge";
pub const DATA_DIR_ENV: &str = "TASMOTA_BRIDGE_DATA_DIR";

/// Get the data directory, creating it if needed.
///
/// `TASMOTA_BRIDGE_DATA_DIR` overrides the default `~/.tasmota_bridge`.
pub fn get_data_dir() -> Result<PathBuf, String> {
    let data_dir = if let Ok(custom_dir) = std::env::var(DATA_DIR_ENV) {
        PathBuf::from(custom_dir)
    } else {
        let home = dirs::home_dir().ok_or("Cannot get home directory")?;
        home.join(DATA_DIR)
    };

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| format!("Failed to create data directory: {}", e))?;
    }

    Ok(data_dir)
}

/// Where the active configuration is persisted.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<BridgeConfig>, ConfigError>;

    async fn save(&self, config: &BridgeConfig) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileConfigStore {
    path: PathBuf,
}

impl JsonFileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data dir>/tasmota_bridge.json`.
    pub fn in_data_dir() -> Result<Self, String> {
        get_data_dir().map(|dir| Self::new(dir.join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ConfigStore for JsonFileConfigStore {
    async fn load(&self) -> Result<Option<BridgeConfig>, ConfigError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::from_io_error(&e)),
        };

        serde_json::from_str(&content).map(Some).map_err(|e| ConfigError::from_json_error(&e))
    }

    async fn save(&self, config: &BridgeConfig) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::WriteError { message: e.to_string() })?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| ConfigError::from_io_error(&e))?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, content).await.map_err(|e| ConfigError::from_io_error(&e))?;
        tokio::fs::rename(&temp_path, &self.path).await.map_err(|e| ConfigError::from_io_error(&e))
    }
}

/// In-memory store, for tests and embedding without a data directory.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    saved: Mutex<Option<BridgeConfig>>,
    read_only: bool,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every `save` fails.
    pub fn read_only() -> Self {
        Self { saved: Mutex::new(None), read_only: true }
    }

    pub fn saved(&self) -> Option<BridgeConfig> {
        self.saved.lock().clone()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> Result<Option<BridgeConfig>, ConfigError> {
        Ok(self.saved())
    }

    async fn save(&self, config: &BridgeConfig) -> Result<(), ConfigError> {
        if self.read_only {
            return Err(ConfigError::WriteError { message: "store is read-only".to_string() });
        }
        *self.saved.lock() = Some(config.clone());
        Ok(())
    }
}
