use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::document_store::{DocumentLimits, MAX_FILE_SIZE, MAX_SEGMENT_TEXT_SIZE};
use crate::qa::QaConfig;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Cap on document size in bytes, checked before parsing
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Cap on replacement segment text in bytes
    #[serde(default = "default_max_segment_text_size")]
    pub max_segment_text_size: usize,

    /// Keep a timestamped sibling backup of the prior file on save
    #[serde(default)]
    pub backup_on_save: bool,

    /// QA engine configuration
    #[serde(default)]
    pub qa: QaConfig,

    /// Spelling backend configuration
    #[serde(default)]
    pub spelling: SpellingBackendConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

fn default_max_segment_text_size() -> usize {
    MAX_SEGMENT_TEXT_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_file_size: default_max_file_size(),
            max_segment_text_size: default_max_segment_text_size(),
            backup_on_save: false,
            qa: QaConfig::default(),
            spelling: SpellingBackendConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file if it exists, falling back to defaults
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(anyhow!("max_file_size must be greater than zero"));
        }
        if self.max_segment_text_size == 0 {
            return Err(anyhow!("max_segment_text_size must be greater than zero"));
        }
        if let Some(language) = &self.spelling.language {
            crate::language_utils::validate_language_code(language)?;
        }
        Ok(())
    }

    /// Document store limits derived from this configuration
    pub fn limits(&self) -> DocumentLimits {
        DocumentLimits {
            max_file_size: self.max_file_size,
            max_segment_text_size: self.max_segment_text_size,
        }
    }
}

/// Spelling backend configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpellingBackendConfig {
    /// Whether the spelling check may be requested at all
    #[serde(default)]
    pub enabled: bool,

    /// Backend endpoint URL; empty selects the public instance
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Language code override; defaults to the document's target language
    #[serde(default)]
    pub language: Option<String>,
}

impl Default for SpellingBackendConfig {
    fn default() -> Self {
        SpellingBackendConfig {
            enabled: false,
            endpoint: String::new(),
            language: None,
        }
    }
}

/// Log level for the CLI logger
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    Warn,
    /// Normal output
    #[default]
    Info,
    /// Verbose output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's level filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
