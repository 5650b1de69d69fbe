//! Configuration loading.
//!
//! `config.json` lives in the data directory (or wherever
//! `VOICE_PREVIEW_CONFIG` points). A missing file yields defaults; a broken
//! file is logged and also yields defaults. Environment variables win over
//! the file.

pub mod paths;
pub mod schema;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use paths::get_data_dir;

pub use schema::AppConfig;

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "VOICE_PREVIEW_CONFIG";

/// Path to config.json.
pub fn get_config_path() -> PathBuf {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) => PathBuf::from(path),
        None => get_data_dir().join("config.json"),
    }
}

/// Load the config file and apply environment overrides.
///
/// Fails only when no OpenAI API key is available from either source.
pub fn load() -> anyhow::Result<AppConfig> {
    let path = get_config_path();
    let mut config: AppConfig = read_json_file(&path).unwrap_or_default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    info!(
        path = %path.display(),
        bind = %config.server.bind,
        chat_model = %config.openai.chat_model,
        remote_tools = config.composio.api_key.is_some(),
        "Config loaded"
    );
    Ok(config)
}

/// Overlay environment values onto `config`. Empty values are ignored.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = get("OPENAI_API_KEY") {
        config.openai.api_key = Some(key);
    }
    if let Some(url) = get("OPENAI_BASE_URL") {
        config.openai.base_url = url;
    }
    if let Some(key) = get("COMPOSIO_API_KEY") {
        config.composio.api_key = Some(key);
    }
    if let Some(bind) = get("VOICE_PREVIEW_BIND") {
        config.server.bind = bind;
    }
    if let Some(dir) = get("VOICE_PREVIEW_PUBLIC_DIR") {
        config.server.public_dir = dir;
    }
}

fn validate(config: &AppConfig) -> anyhow::Result<()> {
    match config.openai.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => {}
        _ => anyhow::bail!("OpenAI API key missing: set OPENAI_API_KEY or openai.apiKey in config"),
    }
    if config.agent.max_rounds == 0 {
        anyhow::bail!("agent.maxRounds must be at least 1");
    }
    if config.speech.max_chars == 0 {
        anyhow::bail!("speech.maxChars must be at least 1");
    }
    Ok(())
}

/// Generic helper: read a JSON file and deserialize it.
fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(val) => Some(val),
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        },
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to read {}: {}", path.display(), e);
            }
            None
        }
    }
}
