use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GradingError;

/// Thresholds and scale used to grade one recognition.
///
/// Word acceptance is looked up in `word_confidence_thresholds` by phone count,
/// clamped to the last entry for longer words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    pub phoneme_acceptance_threshold: i32,
    pub phoneme_experience_threshold: f32,
    pub phrase_acceptance_threshold: i32,
    pub sentence_acceptance_threshold: i32,
    pub word_confidence_thresholds: Vec<i32>,
    /// Scale of the inverse-sigmoid used when blending word confidences.
    pub confidence_scale: f64,
}

impl GradingConfig {
    pub const DEFAULT_CONFIDENCE_SCALE: f64 = 20480.0;

    pub fn load(path: &Path) -> Result<Self, GradingError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| GradingError::io("read grading config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| GradingError::json("parse grading config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GradingError> {
        if self.word_confidence_thresholds.is_empty() {
            return Err(GradingError::invalid_input(
                "word_confidence_thresholds must hold at least one entry",
            ));
        }
        if !self.confidence_scale.is_finite() || self.confidence_scale <= 0.0 {
            return Err(GradingError::invalid_input(format!(
                "confidence_scale must be finite and positive, got {}",
                self.confidence_scale
            )));
        }
        if !self.phoneme_experience_threshold.is_finite() {
            return Err(GradingError::invalid_input(
                "phoneme_experience_threshold must be finite",
            ));
        }
        Ok(())
    }

    /// Word confidence threshold for a word with `phone_count` phones.
    pub fn word_threshold(&self, phone_count: usize) -> i32 {
        let last = self.word_confidence_thresholds.len().saturating_sub(1);
        self.word_confidence_thresholds
            .get(phone_count.min(last))
            .copied()
            .unwrap_or(0)
    }
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            phoneme_acceptance_threshold: 50,
            phoneme_experience_threshold: 60.0,
            phrase_acceptance_threshold: 50,
            sentence_acceptance_threshold: 40,
            // index 0 is used for words without scoreable phones
            word_confidence_thresholds: vec![0, 70, 60, 55, 50, 45],
            confidence_scale: Self::DEFAULT_CONFIDENCE_SCALE,
        }
    }
}
