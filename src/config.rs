//! Configuration for the notifier
//!
//! Settings are merged once at startup, lowest precedence first:
//! defaults, `config.yaml`, `TELEGRAMMER_*` environment variables (including
//! those loaded from `.env`), command-line flags.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Prefix of every environment variable read by [`Settings::resolve`].
pub const ENV_PREFIX: &str = "TELEGRAMMER";

/// Directory under `$HOME/.config` holding the config file.
pub const CONFIG_DIR: &str = "telegrammer";

/// Config file base name, tried with each of [`CONFIG_EXTENSIONS`].
pub const CONFIG_NAME: &str = "config";

pub const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Keys understood in the config file and the environment.
pub const KEY_BOT_KEY: &str = "bot_key";
pub const KEY_USER_ID: &str = "user_id";
pub const KEY_API_URL: &str = "api_url";

/// Raw contents of the YAML config file.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub bot_key: Option<String>,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub api_url: Option<String>,
}

/// Deserialize an id written either as a number or as a numeric string
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_yaml::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_yaml::Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("id out of range: {}", n))),
        Some(serde_yaml::Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected numeric id, got {:?}", s))),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {:?}",
            other
        ))),
    }
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }
}

/// Command-line values that take precedence over every other source.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Explicit config file; replaces the default search path.
    pub config: Option<PathBuf>,
    /// Attachment to send instead of a plain text message.
    pub file: Option<PathBuf>,
    pub server: bool,
}

/// Resolved, immutable settings for one run.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Bot API token.
    pub bot_key: String,
    /// Chat that receives every message.
    pub user_id: i64,
    /// Attachment path; `None` sends a text message.
    pub file: Option<PathBuf>,
    /// Listen for the next inbound message instead of sending.
    pub server: bool,
    /// Bot API server to talk to instead of `api.telegram.org`.
    pub api_url: Option<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("bot_key", &mask(&self.bot_key))
            .field("user_id", &self.user_id)
            .field("file", &self.file)
            .field("server", &self.server)
            .field("api_url", &self.api_url)
            .finish()
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// Environment variable name for a config key: `api.url` -> `TELEGRAMMER_API_URL`
pub fn env_key(key: &str) -> String {
    format!("{}_{}", ENV_PREFIX, key.replace('.', "_").to_uppercase())
}

/// Config files to try, in order. An explicit path disables the search.
pub fn search_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }

    let mut roots = Vec::new();
    if let Some(home) = dirs::home_dir() {
        roots.push(home.join(".config").join(CONFIG_DIR));
    }
    roots.push(PathBuf::from("."));

    roots
        .iter()
        .flat_map(|dir| {
            CONFIG_EXTENSIONS
                .iter()
                .map(move |ext| dir.join(format!("{}.{}", CONFIG_NAME, ext)))
        })
        .collect()
}

impl Settings {
    /// Resolve settings from the process environment and the default config paths.
    ///
    /// Call `dotenvy::dotenv()` first for `.env` values to be picked up.
    pub fn resolve(overrides: &Overrides) -> Self {
        let candidates = search_paths(overrides.config.as_deref());
        Self::resolve_with(overrides, &candidates, |key| std::env::var(key).ok())
    }

    /// Resolve settings from the given config candidates and environment lookup.
    pub fn resolve_with<F>(overrides: &Overrides, candidates: &[PathBuf], env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => match FileConfig::load(path) {
                Ok(file) => {
                    debug!("Loaded config file {}", path.display());
                    settings.apply_file(file);
                }
                Err(err) => warn!("Ignoring config file {}: {}", path.display(), err),
            },
            None => warn!(
                "No config file found (searched: {})",
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }

        settings.apply_env(env);
        settings.apply_overrides(overrides);
        settings
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(bot_key) = file.bot_key {
            self.bot_key = bot_key;
        }
        if let Some(user_id) = file.user_id {
            self.user_id = user_id;
        }
        if file.api_url.is_some() {
            self.api_url = file.api_url;
        }
    }

    pub fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bot_key) = env(&env_key(KEY_BOT_KEY)) {
            self.bot_key = bot_key;
        }
        let user_key = env_key(KEY_USER_ID);
        if let Some(raw) = env(&user_key) {
            match raw.trim().parse::<i64>() {
                Ok(user_id) => self.user_id = user_id,
                Err(_) => warn!("Ignoring {}: not an integer ({:?})", user_key, raw),
            }
        }
        if let Some(api_url) = env(&env_key(KEY_API_URL)) {
            self.api_url = Some(api_url);
        }
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(file) = &overrides.file {
            self.file = Some(file.clone()).filter(|p| !p.as_os_str().is_empty());
        }
        if overrides.server {
            self.server = true;
        }
    }
}
