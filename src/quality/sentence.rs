use serde::{Deserialize, Serialize};

use super::{PhonemeQuality, WordQuality};
use crate::config::GradingConfig;

/// Sentence-level scores plus the thresholds they are judged against.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SentenceQuality {
    pub frame_count: u32,
    pub phrase_confidence: i32,
    pub confidence: i32,
    pub score: i32,
    pub words: Vec<WordQuality>,
    pub phonemes: Vec<PhonemeQuality>,
    pub phoneme_acceptance_threshold: i32,
    pub phoneme_experience_threshold: f32,
    pub phrase_acceptance_threshold: i32,
    pub sentence_acceptance_threshold: i32,
}

impl SentenceQuality {
    pub fn new(config: &GradingConfig) -> Self {
        Self {
            phoneme_acceptance_threshold: config.phoneme_acceptance_threshold,
            phoneme_experience_threshold: config.phoneme_experience_threshold,
            phrase_acceptance_threshold: config.phrase_acceptance_threshold,
            sentence_acceptance_threshold: config.sentence_acceptance_threshold,
            ..Self::default()
        }
    }

    /// A phone without history is always accepted. Otherwise either its score
    /// or its historical average must be strictly above the threshold.
    pub fn accepts(&self, phoneme: &PhonemeQuality) -> bool {
        if phoneme.average == 0.0 {
            return true;
        }
        phoneme.score > self.phoneme_acceptance_threshold
            || phoneme.average > self.phoneme_experience_threshold
    }

    pub fn recognition_accepted(&self) -> bool {
        self.confidence >= self.sentence_acceptance_threshold
            && self.phrase_confidence >= self.phrase_acceptance_threshold
    }

    /// Phone measures grouped per word, words separated by a space.
    pub fn format_measures(&self) -> String {
        let mut out = String::new();
        for phoneme in &self.phonemes {
            if phoneme.is_empty() {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
                continue;
            }
            out.push_str(&phoneme.format_measures());
        }
        out.trim_end().to_string()
    }
}
