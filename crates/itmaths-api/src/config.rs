//! Client configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Connection settings for the remote exam platform.
///
/// Note: Custom Debug impl masks the API token to prevent accidental
/// exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
}

impl std::fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSettings")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
        }
    }
}

fn default_base_url() -> String {
    "https://api.itmaths.app".to_string()
}

/// Top-level itmaths configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItmathsConfig {
    /// Remote backend connection settings.
    #[serde(default)]
    pub backend: BackendSettings,
    /// User name sent with submitted results and history requests.
    #[serde(default = "default_user")]
    pub user: String,
    /// Directory holding durable attempt state (start timestamps).
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    /// Maximum history rows shown by the CLI.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_user() -> String {
    "student".to_string()
}

fn default_store_dir() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".local/share/itmaths"),
        Err(_) => PathBuf::from(".itmaths"),
    }
}

fn default_history_limit() -> usize {
    20
}

impl Default for ItmathsConfig {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            user: default_user(),
            store_dir: default_store_dir(),
            history_limit: default_history_limit(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `itmaths.toml` in the current directory
/// 2. `~/.config/itmaths/config.toml`
///
/// Environment variable overrides: `ITMATHS_BASE_URL`, `ITMATHS_API_TOKEN`,
/// `ITMATHS_USER`, `ITMATHS_STORE_DIR`.
pub fn load_config() -> Result<ItmathsConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ItmathsConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("itmaths.toml");
        if local.exists() {
            Some(local)
        } else if let Some(global) = global_config_path() {
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ItmathsConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ItmathsConfig::default(),
    };

    // Apply env var overrides
    if let Ok(url) = std::env::var("ITMATHS_BASE_URL") {
        config.backend.base_url = url;
    }
    if let Ok(token) = std::env::var("ITMATHS_API_TOKEN") {
        config.backend.api_token = Some(token);
    }
    if let Ok(user) = std::env::var("ITMATHS_USER") {
        config.user = user;
    }
    if let Ok(dir) = std::env::var("ITMATHS_STORE_DIR") {
        config.store_dir = PathBuf::from(dir);
    }

    // Resolve ${VAR} references
    config.backend.base_url = resolve_env_vars(&config.backend.base_url);
    config.backend.api_token = config
        .backend
        .api_token
        .as_ref()
        .map(|t| resolve_env_vars(t))
        .filter(|t| !t.is_empty());

    Ok(config)
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("itmaths").join("config.toml"))
}
