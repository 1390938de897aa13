//! Application configuration for docbrief.
//!
//! User config lives at `~/.docbrief/docbrief.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DocBriefError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docbrief.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docbrief";

// ---------------------------------------------------------------------------
// Config structs (matching docbrief.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote generation endpoint settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Conversation settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Upload handling.
    #[serde(default)]
    pub uploads: UploadsConfig,
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for question answering.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used by both blog pipeline stages.
    #[serde(default = "default_agent_model")]
    pub agent_model: String,

    /// API root; `/v1beta/models/{model}:generateContent` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            chat_model: default_chat_model(),
            agent_model: default_agent_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".into()
}
fn default_chat_model() -> String {
    "gemini-pro".into()
}
fn default_agent_model() -> String {
    "gemini-2.0-flash-exp".into()
}
fn default_base_url() -> Url {
    Url::parse("https://generativelanguage.googleapis.com").expect("static URL is valid")
}
fn default_timeout_secs() -> u64 {
    120
}

/// `[chat]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of most recent turns included in each QA prompt.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Optional cap on retained turns; oldest are evicted first. Unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retained_turns: Option<usize>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            max_retained_turns: None,
        }
    }
}

fn default_history_window() -> usize {
    5
}

/// `[uploads]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Directory receiving a copy of every processed file.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docbrief/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| DocBriefError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docbrief/docbrief.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocBriefError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        DocBriefError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    if config.chat.history_window == 0 {
        return Err(DocBriefError::config(format!(
            "{}: chat.history_window must be at least 1",
            path.display()
        )));
    }

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocBriefError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocBriefError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocBriefError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Resolve the Gemini API key from the configured env var.
///
/// Fails when the variable is unset or empty.
pub fn validate_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.gemini.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(DocBriefError::config(format!(
            "Gemini API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://aistudio.google.com/app/apikey"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("history_window"));
        assert!(toml_str.contains("GOOGLE_API_KEY"));
        assert!(!toml_str.contains("max_retained_turns"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.chat.history_window, 5);
        assert_eq!(parsed.gemini.api_key_env, "GOOGLE_API_KEY");
        assert_eq!(parsed.gemini.chat_model, "gemini-pro");
        assert_eq!(parsed.gemini.agent_model, "gemini-2.0-flash-exp");
        assert_eq!(parsed.uploads.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[chat]
history_window = 8
max_retained_turns = 200

[gemini]
base_url = "http://localhost:8080"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.chat.history_window, 8);
        assert_eq!(config.chat.max_retained_turns, Some(200));
        assert_eq!(config.gemini.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.gemini.timeout_secs, 120);
    }

    #[test]
    fn zero_history_window_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("docbrief.toml");
        std::fs::write(&path, "[chat]\nhistory_window = 0\n").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("history_window"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("docbrief.toml");
        std::fs::write(&path, "[gemini]\nbase_url = \"not a url\"\n").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, DocBriefError::Config { .. }));
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.gemini.api_key_env = "DOCBRIEF_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
