use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable that overrides the configured backend URL.
pub const BASE_URL_ENV: &str = "DQCHAT_BASE_URL";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Backend root, e.g. "http://localhost:8000"
    pub base_url: Option<String>,
    /// Data file registered right after a successful connect
    pub data_path: Option<String>,
    /// Print a one-line summary per tool result under agent messages
    pub show_tool_results: Option<bool>,
}

/// Settings the session actually runs with, after flags, environment and
/// file have been merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub data_path: Option<String>,
    pub show_tool_results: bool,
}

/// Keys accepted by `dqchat set` / `dqchat unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    BaseUrl,
    DataPath,
    ShowToolResults,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [
        ConfigKey::BaseUrl,
        ConfigKey::DataPath,
        ConfigKey::ShowToolResults,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::BaseUrl => "base-url",
            ConfigKey::DataPath => "data-path",
            ConfigKey::ShowToolResults => "show-tool-results",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<_> = ConfigKey::ALL.iter().map(|key| key.as_str()).collect();
                format!("Unknown config key '{s}'. Known keys: {}", known.join(", "))
            })
    }
}

fn parse_toggle(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("Expected on/off, got '{other}'")),
    }
}

impl Config {
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for {key}"));
        }
        match key {
            ConfigKey::BaseUrl => {
                reqwest::Url::parse(value)
                    .map_err(|err| format!("Invalid base URL '{value}': {err}"))?;
                self.base_url = Some(value.to_string());
            }
            ConfigKey::DataPath => self.data_path = Some(value.to_string()),
            ConfigKey::ShowToolResults => self.show_tool_results = Some(parse_toggle(value)?),
        }
        Ok(())
    }

    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::BaseUrl => self.base_url = None,
            ConfigKey::DataPath => self.data_path = None,
            ConfigKey::ShowToolResults => self.show_tool_results = None,
        }
    }

    /// Merge with command-line flags and the environment.
    ///
    /// Precedence per field: flag, then `DQCHAT_BASE_URL` (base URL only),
    /// then this file, then the built-in default.
    pub fn resolve(
        &self,
        base_url_flag: Option<&str>,
        data_flag: Option<&str>,
        base_url_env: Option<&str>,
    ) -> ResolvedConfig {
        let non_empty = |value: &&str| !value.trim().is_empty();
        let base_url = base_url_flag
            .filter(non_empty)
            .or(base_url_env.filter(non_empty))
            .or(self.base_url.as_deref().filter(non_empty))
            .unwrap_or(DEFAULT_BASE_URL)
            .trim()
            .to_string();
        let data_path = data_flag
            .filter(non_empty)
            .or(self.data_path.as_deref().filter(non_empty))
            .map(|path| path.trim().to_string());

        ResolvedConfig {
            base_url,
            data_path,
            show_tool_results: self.show_tool_results.unwrap_or(true),
        }
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/dqchat/config.toml` → `~/.config/dqchat/config.toml`
/// - Windows: `C:\\Users\\user\\AppData\\Roaming\\dqchat\\config` → unchanged
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
