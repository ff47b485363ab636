use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{Result, TmplError, DEFAULT_STORAGE_KEY};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted storage slots
    pub data_dir: PathBuf,

    /// Storage key the templates are saved under
    pub storage_key: String,

    /// Delay before a content edit is committed (milliseconds)
    pub debounce_ms: u64,

    /// Editor command for content editing
    pub editor_command: Option<String>,

    /// Default server for `fetch`
    pub server_url: Option<String>,

    /// Timeout for server requests (seconds)
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".msgtmpl"));

        Self {
            data_dir,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            debounce_ms: 100,
            editor_command: None,
            server_url: None,
            fetch_timeout_secs: 10,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "msgtmpl")
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from(".msgtmpl/config.json"))
    }

    /// Loads the configuration at `path`, falling back to defaults if the file is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| TmplError::ConfigError {
            message: format!("{}: {}", path.display(), e),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_| TmplError::DirectoryError {
                path: parent.to_path_buf(),
            })?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Applies a `key=value` assignment
    pub fn set(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or_else(|| TmplError::ConfigError {
                message: format!("Expected key=value, got '{}'", assignment),
            })?;

        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
        let number = |v: &str| {
            v.parse::<u64>().map_err(|_| TmplError::ConfigError {
                message: format!("'{}' expects a number, got '{}'", key, v),
            })
        };

        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "storage_key" if !value.is_empty() => self.storage_key = value.to_string(),
            "debounce_ms" => self.debounce_ms = number(value)?,
            "editor_command" => self.editor_command = optional(value),
            "server_url" => self.server_url = optional(value),
            "fetch_timeout_secs" => self.fetch_timeout_secs = number(value)?,
            _ => {
                return Err(TmplError::ConfigError {
                    message: format!("Unknown or invalid setting '{}'", assignment),
                })
            }
        }
        Ok(())
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        // First try the configured editor
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        // Then try environment variable
        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        // Fall back to platform defaults
        if cfg!(windows) {
            "notepad".to_string()
        } else {
            for editor in &["nano", "vim", "vi"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}
