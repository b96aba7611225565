//! User configuration (`<config_dir>/cxsheet/config.toml`)
//!
//! Every field is optional; command-line flags take precedence over the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::batch::PacingConfig;
use crate::error::{CxSheetError, Result};
use crate::sheets::google::{DRIVE_URL, SHEETS_URL};

pub const APP_DIR: &str = "cxsheet";
pub const CONFIG_FILE: &str = "config.toml";
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub agent: AgentConfig,
    pub endpoints: EndpointConfig,
    pub pacing: PacingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Service-account JSON key
    pub credentials: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// `projects/<p>/locations/<l>/agents/<id>` used when `--agent` is omitted
    pub default_agent: Option<String>,
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Overrides the regional Dialogflow host
    pub dialogflow: Option<String>,
    pub sheets: String,
    pub drive: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            dialogflow: None,
            sheets: SHEETS_URL.to_string(),
            drive: DRIVE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location; a missing file yields defaults
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| CxSheetError::io(path, e))?;
        let config: Self = toml::from_str(&raw).map_err(|e| {
            CxSheetError::configuration(format!("invalid config {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Flag, then config file, then `GOOGLE_APPLICATION_CREDENTIALS`
    pub fn credentials_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.auth.credentials.clone())
            .or_else(|| std::env::var_os(CREDENTIALS_ENV).map(PathBuf::from))
            .ok_or_else(|| {
                CxSheetError::configuration(format!(
                    "no credentials: pass --credentials, set [auth] credentials in the config file or {}",
                    CREDENTIALS_ENV
                ))
            })
    }

    /// Flag, then `[agent] default_agent`
    pub fn agent(&self, flag: Option<&str>) -> Result<String> {
        flag.map(str::to_string)
            .or_else(|| self.agent.default_agent.clone())
            .ok_or_else(|| {
                CxSheetError::configuration("no agent: pass --agent or set [agent] default_agent")
            })
    }
}
