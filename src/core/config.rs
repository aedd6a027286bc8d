use crate::core::knn::DEFAULT_K;
use crate::models::landmark::HAND_LANDMARK_COUNT;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Gestures the application ships example files for
pub const DEFAULT_LABELS: [&str; 5] = ["good_luck", "good_job", "loser", "call_me", "rock"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine home directory")]
    NoHomeDirectory,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Trainer and recognizer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainerConfig {
    /// Directory holding one `<label>.json` example file per gesture
    pub data_dir: PathBuf,
    /// Recognized gestures, in display and evaluation order
    pub labels: Vec<String>,
    /// Neighbors consulted per classification
    pub k: usize,
    /// Landmarks per hand produced by the detector
    pub landmark_count: usize,
    /// Hands reported below this detection confidence are ignored (0.0-1.0)
    pub min_hand_confidence: f32,
    /// Buffered predictions between the recognizer loop and its consumer
    pub prediction_buffer: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());

        let mut data_dir = PathBuf::from(home);
        data_dir.push(".gesture_data");
        data_dir.push("examples");

        Self {
            data_dir,
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            k: DEFAULT_K,
            landmark_count: HAND_LANDMARK_COUNT,
            min_hand_confidence: 0.5,
            prediction_buffer: 100,
        }
    }
}

impl TrainerConfig {
    /// Load configuration from the default location, creating it with defaults if missing
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load configuration from `path`, creating it with defaults if missing
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: TrainerConfig = serde_json::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.labels.is_empty() {
            return Err(ConfigError::Invalid("Labels cannot be empty".into()));
        }

        let mut seen = HashSet::new();
        for label in &self.labels {
            if label.is_empty() || label.contains(['/', '\\']) || label.starts_with('.') {
                return Err(ConfigError::Invalid(format!(
                    "Invalid label: {:?}. Labels name example files and must be plain file stems",
                    label
                )));
            }
            if !seen.insert(label.as_str()) {
                return Err(ConfigError::Invalid(format!("Duplicate label: {}", label)));
            }
        }

        if self.k == 0 {
            return Err(ConfigError::Invalid("Invalid k: 0. Must be at least 1".into()));
        }

        if self.landmark_count == 0 {
            return Err(ConfigError::Invalid(
                "Invalid landmark count: 0. Must be at least 1".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.min_hand_confidence) {
            return Err(ConfigError::Invalid(format!(
                "Invalid hand confidence threshold: {}. Must be between 0.0 and 1.0",
                self.min_hand_confidence
            )));
        }

        if self.prediction_buffer == 0 {
            return Err(ConfigError::Invalid(
                "Invalid prediction buffer: 0. Must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Expected feature vector length for this configuration
    pub fn feature_length(&self) -> usize {
        self.landmark_count * 3
    }

    /// Reset to default configuration
    pub fn reset() -> ConfigResult<Self> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    /// Get the configuration file path
    fn get_config_path() -> ConfigResult<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| ConfigError::NoHomeDirectory)?;

        let mut path = PathBuf::from(home);
        path.push(".gesture_data");
        path.push("config");
        path.push("settings.json");

        Ok(path)
    }
}
