/*!
 * Persisted user settings
 *
 * Settings live in a small JSON file under the user's configuration
 * directory. Every change goes through [`SettingsCommand`] so the CLI flags
 * and the store share a single typed entry point.
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{PromptError, Result, ResultExt};
use crate::tree::DepthLimit;

/// Directory name under the platform configuration directory
pub const SETTINGS_DIR: &str = "prompt-perfect";

/// Settings file name
pub const SETTINGS_FILE: &str = "settings.json";

/// Default limit applied when prompt length limiting is switched on
pub const DEFAULT_MAX_TOKENS: usize = 4096;

/// User-facing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Refuse prompts longer than `max_tokens`
    #[serde(default)]
    pub limit_prompt_length: bool,

    /// Word-token budget when limiting is on
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Copy the prompt to the system clipboard
    #[serde(default)]
    pub auto_copy_to_clipboard: bool,

    /// Levels of the project tree to show
    #[serde(
        default,
        serialize_with = "serialize_depth",
        deserialize_with = "deserialize_depth"
    )]
    pub tree_depth_limit: DepthLimit,

    /// Free text appended after the files
    #[serde(default)]
    pub additional_instructions: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            limit_prompt_length: false,
            max_tokens: default_max_tokens(),
            auto_copy_to_clipboard: false,
            tree_depth_limit: DepthLimit::Unlimited,
            additional_instructions: String::new(),
        }
    }
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

fn serialize_depth<S: Serializer>(limit: &DepthLimit, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_i64(limit.as_i64())
}

fn deserialize_depth<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<DepthLimit, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_depth_limit(&value).unwrap_or_else(|e| {
        log::warn!("{}; falling back to an unlimited tree depth", e);
        DepthLimit::Unlimited
    }))
}

/// Interpret a raw settings value as a depth limit
///
/// Integers map directly (negative means unlimited), integer strings are
/// accepted, and null means unlimited.
pub fn parse_depth_limit(value: &Value) -> Result<DepthLimit> {
    let out_of_range = || PromptError::ConfigurationOutOfRange {
        key: "treeDepthLimit".to_string(),
        value: value.to_string(),
    };

    match value {
        Value::Null => Ok(DepthLimit::Unlimited),
        Value::Number(n) => n.as_i64().map(DepthLimit::from).ok_or_else(out_of_range),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(DepthLimit::from)
            .map_err(|_| out_of_range()),
        _ => Err(out_of_range()),
    }
}

/// Operations on the stored settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsCommand {
    /// Persist the given settings
    Save(Settings),
    /// Read the stored settings
    Show,
    /// Remove the stored settings, returning to defaults
    Reset,
}

/// JSON file holding the settings
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform default location
    pub fn open_default() -> Result<Self> {
        let dir = dirs::config_dir().ok_or_else(|| {
            PromptError::Config("Could not determine the configuration directory".to_string())
        })?;
        Ok(Self::new(dir.join(SETTINGS_DIR).join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; a missing file yields defaults
    pub fn load(&self) -> Result<Settings> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", self.path.display());
                return Ok(Settings::default());
            }
            Err(e) => return Err(PromptError::from_io(&self.path, e)),
        };

        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings {}", self.path.display()))
    }

    /// Write settings, creating the parent directory if needed
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)?;
        log::info!("Settings saved to {}", self.path.display());
        Ok(())
    }

    /// Delete the stored settings
    pub fn reset(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PromptError::from_io(&self.path, e)),
        }
    }

    /// Run a command and return the settings now in effect
    pub fn dispatch(&self, command: SettingsCommand) -> Result<Settings> {
        log::debug!("Settings command: {:?}", command);
        match command {
            SettingsCommand::Save(settings) => {
                self.save(&settings)?;
                Ok(settings)
            }
            SettingsCommand::Show => self.load(),
            SettingsCommand::Reset => {
                self.reset()?;
                Ok(Settings::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_file_missing() -> Result<()> {
        let dir = tempdir()?;
        let store = SettingsStore::new(dir.path().join("nope").join(SETTINGS_FILE));
        assert_eq!(store.load()?, Settings::default());
        Ok(())
    }

    #[test]
    fn test_save_show_reset() -> Result<()> {
        let dir = tempdir()?;
        let store = SettingsStore::new(dir.path().join("nested").join(SETTINGS_FILE));

        let settings = Settings {
            limit_prompt_length: true,
            max_tokens: 100,
            auto_copy_to_clipboard: true,
            tree_depth_limit: DepthLimit::Levels(2),
            additional_instructions: "Be brief.".to_string(),
        };

        store.dispatch(SettingsCommand::Save(settings.clone()))?;
        assert_eq!(store.dispatch(SettingsCommand::Show)?, settings);

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path())?)?;
        assert_eq!(raw["treeDepthLimit"], json!(2));
        assert_eq!(raw["maxTokens"], json!(100));

        assert_eq!(store.dispatch(SettingsCommand::Reset)?, Settings::default());
        assert!(!store.path().exists());
        assert_eq!(store.dispatch(SettingsCommand::Show)?, Settings::default());
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"autoCopyToClipboard": true}"#).unwrap();
        assert!(settings.auto_copy_to_clipboard);
        assert_eq!(settings.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(settings.tree_depth_limit, DepthLimit::Unlimited);
    }

    #[test]
    fn test_non_integer_depth_falls_back_to_unlimited() {
        let settings: Settings = serde_json::from_str(r#"{"treeDepthLimit": "deep"}"#).unwrap();
        assert_eq!(settings.tree_depth_limit, DepthLimit::Unlimited);

        let settings: Settings = serde_json::from_str(r#"{"treeDepthLimit": 1.5}"#).unwrap();
        assert_eq!(settings.tree_depth_limit, DepthLimit::Unlimited);
    }

    #[test]
    fn test_parse_depth_limit() {
        assert_eq!(parse_depth_limit(&json!(3)).unwrap(), DepthLimit::Levels(3));
        assert_eq!(parse_depth_limit(&json!(-1)).unwrap(), DepthLimit::Unlimited);
        assert_eq!(parse_depth_limit(&json!(" 4 ")).unwrap(), DepthLimit::Levels(4));
        assert_eq!(parse_depth_limit(&Value::Null).unwrap(), DepthLimit::Unlimited);
        assert!(matches!(
            parse_depth_limit(&json!(true)),
            Err(PromptError::ConfigurationOutOfRange { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{ not json")?;
        assert!(SettingsStore::new(path).load().is_err());
        Ok(())
    }
}
