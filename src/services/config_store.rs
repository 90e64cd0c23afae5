// Configuration Storage Service
// Classifier settings and scoring constants, persisted as JSON

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::ContentType;

/// Arbitrary scaling unit shared by dictionary scores and heuristic signals (≈ 200 / ln 2).
pub const FEATURE_SCORE_SCALE: f32 = 288.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to create config dir: {0}")]
    CreateDir(#[source] std::io::Error),
    #[error("Failed to read config: {0}")]
    Read(#[source] std::io::Error),
    #[error("Failed to write config: {0}")]
    Write(#[source] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    #[serde(default = "default_true")]
    pub use_question_marks: bool,
    #[serde(default = "default_true")]
    pub use_exclamation_points: bool,
    #[serde(default = "default_true")]
    pub use_emoticons: bool,
    /// Minimum feature relevance in units of the scale; `None` uses the content-type default.
    #[serde(default)]
    pub relevance_cutoff: Option<f32>,
    /// Minimum |raw score| in units of the scale for a non-neutral decision.
    #[serde(default)]
    pub neutral_cutoff: Option<f32>,
    #[serde(default = "default_max_feature_size")]
    pub max_feature_size: usize,
    #[serde(default)]
    pub debug_level: u32,
    #[serde(default)]
    pub pre_normalized: bool,
    #[serde(default)]
    pub scoring: ScoringConstants,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            use_question_marks: true,
            use_exclamation_points: true,
            use_emoticons: true,
            relevance_cutoff: None,
            neutral_cutoff: None,
            max_feature_size: default_max_feature_size(),
            debug_level: 0,
            pre_normalized: false,
            scoring: ScoringConstants::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConstants {
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_title_weight")]
    pub title_weight: i64,
    #[serde(default = "default_one")]
    pub body_weight: i64,
    #[serde(default = "default_one")]
    pub url_weight: i64,
    #[serde(default = "default_emoticon_weight")]
    pub emoticon_weight: i64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl Default for ScoringConstants {
    fn default() -> Self {
        Self {
            scale: FEATURE_SCORE_SCALE,
            title_weight: 3,
            body_weight: 1,
            url_weight: 1,
            emoticon_weight: 1000,
            max_tokens: 500,
        }
    }
}

fn default_true() -> bool { true }
fn default_max_feature_size() -> usize { 7 }
fn default_scale() -> f32 { FEATURE_SCORE_SCALE }
fn default_title_weight() -> i64 { 3 }
fn default_one() -> i64 { 1 }
fn default_emoticon_weight() -> i64 { 1000 }
fn default_max_tokens() -> usize { 500 }

/// Largest section or emoticon weight `validate` accepts, in either direction.
pub const MAX_WEIGHT: i64 = 1_000_000;

/// Cutoffs resolved for one call, already multiplied by the scale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScaledCutoffs {
    pub relevance: i32,
    pub neutral: i64,
}

impl ClassifierConfig {
    /// Reject settings no classification call could honour.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_feature_size == 0 {
            return Err("maxFeatureSize must be at least 1".to_string());
        }
        if !(self.scoring.scale.is_finite() && self.scoring.scale > 0.0) {
            return Err(format!("scale must be positive, got {}", self.scoring.scale));
        }
        if self.scoring.max_tokens == 0 {
            return Err("maxTokens must be at least 1".to_string());
        }
        for (name, weight) in [
            ("titleWeight", self.scoring.title_weight),
            ("bodyWeight", self.scoring.body_weight),
            ("urlWeight", self.scoring.url_weight),
            ("emoticonWeight", self.scoring.emoticon_weight),
        ] {
            if weight.unsigned_abs() > MAX_WEIGHT.unsigned_abs() {
                return Err(format!("{} must be within ±{}, got {}", name, MAX_WEIGHT, weight));
            }
        }
        for (name, value) in [
            ("relevanceCutoff", self.relevance_cutoff),
            ("neutralCutoff", self.neutral_cutoff),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(format!("{} must be finite, got {}", name, v));
                }
            }
        }
        Ok(())
    }

    /// Resolve cutoffs for a content type. If either one is unset or negative,
    /// both fall back to the content type's defaults.
    pub fn cutoffs(&self, content_type: ContentType) -> ScaledCutoffs {
        let (rc, nc) = match (self.relevance_cutoff, self.neutral_cutoff) {
            (Some(rc), Some(nc)) if rc >= 0.0 && nc >= 0.0 => (rc, nc),
            _ => content_type.default_cutoffs(),
        };
        ScaledCutoffs {
            relevance: (self.scoring.scale * rc) as i32,
            neutral: (self.scoring.scale * nc) as i64,
        }
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sentiscope"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Load configuration; a missing file yields defaults.
    pub fn load(&self) -> Result<ClassifierConfig, ConfigError> {
        if !self.config_file.exists() {
            return Ok(ClassifierConfig::default());
        }
        load_config_file(&self.config_file)
    }

    pub fn save(&self, config: &ClassifierConfig) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir).map_err(ConfigError::CreateDir)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_file, content).map_err(ConfigError::Write)
    }
}

/// Read a config file from an explicit path.
pub fn load_config_file(path: &Path) -> Result<ClassifierConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Read)?;
    Ok(serde_json::from_str(&content)?)
}
