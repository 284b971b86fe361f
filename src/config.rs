use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sync::keyring;
use crate::sync::sheets::{DEFAULT_API_BASE, DEFAULT_SHEET_NAME};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Keyring(String),
}

pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("sheetbook")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILE)
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

/// Settings kept in `config.json`. The API key is not among them: it lives
/// in the system keyring.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub sheet_id: String,
    pub sheet_name: String,
    pub api_base: String,
    pub debug_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheet_id: String::new(),
            sheet_name: default_sheet_name(),
            api_base: default_api_base(),
            debug_logging: false,
        }
    }
}

impl AppConfig {
    /// Read the config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// The two values that must both be present before any sheet call is made.
#[derive(Clone, PartialEq, Eq)]
pub struct SheetCredentials {
    pub sheet_id: String,
    pub api_key: String,
}

impl SheetCredentials {
    /// Returns `None` unless both values are non-empty after trimming.
    pub fn new(sheet_id: &str, api_key: &str) -> Option<Self> {
        let sheet_id = sheet_id.trim();
        let api_key = api_key.trim();
        if sheet_id.is_empty() || api_key.is_empty() {
            return None;
        }
        Some(Self {
            sheet_id: sheet_id.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl std::fmt::Debug for SheetCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetCredentials")
            .field("sheet_id", &self.sheet_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Where the sheet id and API key are persisted between runs.
#[allow(async_fn_in_trait)]
pub trait ConfigProvider {
    /// `Ok(None)` means unconfigured.
    async fn load(&self) -> Result<Option<SheetCredentials>, ConfigError>;
    async fn save(&self, credentials: &SheetCredentials) -> Result<(), ConfigError>;
    async fn clear(&self) -> Result<(), ConfigError>;
}

/// Sheet id in `config.json`, API key in the Secret Service keyring.
pub struct LocalConfigProvider {
    path: PathBuf,
}

impl LocalConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn app_config(&self) -> Result<AppConfig, ConfigError> {
        AppConfig::load(&self.path)
    }
}

impl Default for LocalConfigProvider {
    fn default() -> Self {
        Self::new(default_config_path())
    }
}

impl ConfigProvider for LocalConfigProvider {
    async fn load(&self) -> Result<Option<SheetCredentials>, ConfigError> {
        let config = self.app_config()?;
        if config.sheet_id.trim().is_empty() {
            return Ok(None);
        }
        let api_key = keyring::load_api_key().await?.unwrap_or_default();
        Ok(SheetCredentials::new(&config.sheet_id, &api_key))
    }

    async fn save(&self, credentials: &SheetCredentials) -> Result<(), ConfigError> {
        let mut config = self.app_config()?;
        // Key before sheet id: a stored sheet id marks the app as configured.
        keyring::store_api_key(&credentials.api_key).await?;
        config.sheet_id = credentials.sheet_id.clone();
        config.save(&self.path)?;
        log::info!("Saved configuration to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ConfigError> {
        let mut config = self.app_config()?;
        config.sheet_id.clear();
        config.save(&self.path)?;
        keyring::delete_api_key().await?;
        log::info!("Cleared stored configuration");
        Ok(())
    }
}
