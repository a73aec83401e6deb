use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::source::DEFAULT_BASE_URL;
use crate::translation::Translation;

pub const API_KEY_ENV: &str = "BIBLIA_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_translation: Translation,
    pub font_size: u16,
    pub speech_language: String,
    pub speech_program: String,
    pub fetch_timeout_secs: u64,
    pub speech_init_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_translation: Translation::default(),
            font_size: 16,
            speech_language: "pt-BR".to_string(),
            speech_program: "espeak-ng".to_string(),
            fetch_timeout_secs: 15,
            speech_init_timeout_secs: 5,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the user config dir, falling back to defaults when there is no
    /// file. `BIBLIA_API_KEY` wins over the stored key.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Settings handed to each new chapter screen.
    pub fn screen_settings(&self) -> ScreenSettings {
        ScreenSettings {
            translation: self.default_translation,
            font_size: self.font_size,
            speech_language: self.speech_language.clone(),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            speech_init_timeout: Duration::from_secs(self.speech_init_timeout_secs),
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("capitulo").join("config.json"))
    }
}

/// Per-screen initial state. Each chapter screen gets its own copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSettings {
    pub translation: Translation,
    pub font_size: u16,
    pub speech_language: String,
    pub fetch_timeout: Duration,
    pub speech_init_timeout: Duration,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Config::default().screen_settings()
    }
}
