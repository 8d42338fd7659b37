//! Persisted key-value settings.
//!
//! The engine only needs read/write-string semantics; anything richer lives
//! with the caller. Keys are versioned by convention (`render-prompt-3`) so a
//! default-text change shows up for users who never touched the old one.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Settings key for the global render instruction. The numeric suffix bumps
/// whenever the default text changes.
pub const RENDER_INSTRUCTION_KEY: &str = "render-prompt-3";

/// Default render instruction sent with every generation request unless the
/// user has overridden it.
pub const DEFAULT_RENDER_INSTRUCTION: &str = "Generate an image based on the contents provided \
by the user. If the user provides a collage of styles, combine them into one coherent image in \
a high-fidelity style. Move and reposition subjects if needed to match the user's intent.";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("could not determine settings directory")]
    NoHome,
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// String key-value store surviving process restarts.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> SettingsResult<()>;
    fn remove(&mut self, key: &str) -> SettingsResult<()>;

    /// The stored value for `key`, or `default` when unset.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

/// In-memory settings, used in tests and headless sessions.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: HashMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> SettingsResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// File-backed settings: one flat JSON object, rewritten on every set.
pub struct FileSettings {
    path: PathBuf,
    values: Map<String, Value>,
}

impl FileSettings {
    /// Open (or create) the settings file at `path`.
    pub fn new(path: PathBuf) -> SettingsResult<Self> {
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            match serde_json::from_str::<Value>(&raw)? {
                Value::Object(map) => map,
                _ => Map::new(),
            }
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            Map::new()
        };
        Ok(Self { path, values })
    }

    /// Open settings in the default location.
    ///
    /// On Unix: `~/.local/share/blockboard/settings.json`
    /// On Windows: `%APPDATA%\blockboard\settings.json`
    pub fn default_location() -> SettingsResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or(SettingsError::NoHome)?;
        Self::new(base.join("blockboard").join("settings.json"))
    }

    fn flush(&self) -> SettingsResult<()> {
        let json = serde_json::to_string_pretty(&Value::Object(self.values.clone()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).and_then(Value::as_str).map(str::to_string)
    }

    fn set(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        self.values
            .insert(key.to_string(), Value::String(value.to_string()));
        self.flush()
    }

    fn remove(&mut self, key: &str) -> SettingsResult<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_get_or_default() {
        let mut settings = MemorySettings::new();
        assert_eq!(
            settings.get_or(RENDER_INSTRUCTION_KEY, DEFAULT_RENDER_INSTRUCTION),
            DEFAULT_RENDER_INSTRUCTION
        );
        settings.set(RENDER_INSTRUCTION_KEY, "custom").unwrap();
        assert_eq!(
            settings.get_or(RENDER_INSTRUCTION_KEY, DEFAULT_RENDER_INSTRUCTION),
            "custom"
        );
    }

    #[test]
    fn test_file_settings_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = FileSettings::new(path.clone()).unwrap();
        settings.set("camera-device", "front").unwrap();
        drop(settings);

        let reopened = FileSettings::new(path).unwrap();
        assert_eq!(reopened.get("camera-device").as_deref(), Some("front"));
    }

    #[test]
    fn test_file_settings_remove() {
        let dir = tempdir().unwrap();
        let mut settings = FileSettings::new(dir.path().join("settings.json")).unwrap();
        settings.set("k", "v").unwrap();
        settings.remove("k").unwrap();
        assert_eq!(settings.get("k"), None);
    }

    #[test]
    fn test_file_settings_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("settings.json");
        let mut settings = FileSettings::new(path).unwrap();
        settings.set("k", "v").unwrap();
        assert_eq!(settings.get("k").as_deref(), Some("v"));
    }
}
