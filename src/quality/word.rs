use serde::{Deserialize, Serialize};

use crate::config::GradingConfig;
use crate::types::WordScore;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WordQuality {
    pub phone_count: usize,
    pub start_frame: u32,
    pub end_frame: u32,
    pub frame_count: u32,
    pub confidence: i32,
    pub score: i32,
    pub accepted: bool,
}

impl WordQuality {
    /// Builds the word record and decides acceptance from the per-phone-count
    /// threshold table.
    pub fn evaluate(word: &WordScore, phone_count: usize, config: &GradingConfig) -> Self {
        let threshold = config.word_threshold(phone_count);
        let accepted = word.confidence >= threshold;
        tracing::debug!(
            phone_count,
            confidence = word.confidence,
            threshold,
            accepted,
            "quality: word acceptance"
        );
        Self {
            phone_count,
            start_frame: word.start_frame,
            end_frame: word.start_frame.saturating_add(word.frame_count),
            frame_count: word.frame_count,
            confidence: word.confidence,
            score: word.score,
            accepted,
        }
    }
}
