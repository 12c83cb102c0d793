//! Front-end configuration.
//!
//! Optional settings live in `~/.config/opal/config.json`. The core never
//! picks paths itself, so resolving where the auth record lives happens here:
//! `--auth-file`, then `OPAL_AUTH_FILE`, then the config file, then `~/.opal`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use opal_core::config::DEFAULT_BASE_URL;
use opal_core::ClientConfig;
use serde::{Deserialize, Serialize};
use url::Url;

/// Application name used for the config directory
const APP_NAME: &str = "opal";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Auth record file name in the home directory
const DEFAULT_AUTH_FILE: &str = ".opal";

/// Environment variable naming the auth record file
pub const AUTH_FILE_ENV: &str = "OPAL_AUTH_FILE";

/// HTTP request timeout in seconds.
/// 30s allows for a slow site while failing fast enough for an interactive tool.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub auth_file: Option<PathBuf>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Where the auth record lives.
    pub fn auth_file(&self, flag: Option<PathBuf>, env: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = flag.or(env).or_else(|| self.auth_file.clone()) {
            return Ok(path);
        }
        let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(DEFAULT_AUTH_FILE))
    }

    pub fn client_config(&self) -> Result<ClientConfig> {
        let base = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(base).with_context(|| format!("invalid base_url {base:?}"))?;
        let timeout = self.request_timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS);
        Ok(ClientConfig::new(base_url).with_timeout(Duration::from_secs(timeout)))
    }
}
