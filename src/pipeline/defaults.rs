use crate::config::GradingConfig;
use crate::error::GradingError;
use crate::matching::evaluate_confidence;
use crate::pipeline::traits::{ConfidenceCombiner, ReferenceAligner};
use crate::quality::WordQuality;

pub struct SigmoidConfidenceCombiner {
    scale: f64,
}

impl SigmoidConfidenceCombiner {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }
}

impl Default for SigmoidConfidenceCombiner {
    fn default() -> Self {
        Self::new(GradingConfig::DEFAULT_CONFIDENCE_SCALE)
    }
}

impl ConfidenceCombiner for SigmoidConfidenceCombiner {
    fn combine(&self, words: &[WordQuality]) -> Result<i32, GradingError> {
        evaluate_confidence(words, self.scale)
    }
}

/// Reads the reference sentence strictly by position: each grapheme consumes
/// its own length in characters and words are separated by whitespace.
// TODO: search for the spoken word in the reference and fall back to the
// positional walk when it is not found, so one misaligned word does not shift
// every later offset.
pub struct PositionalAligner;

impl ReferenceAligner for PositionalAligner {
    fn next_word_start(&self, reference: &[char], cursor: usize) -> usize {
        let mut pos = cursor;
        while reference.get(pos).is_some_and(|c| c.is_whitespace()) {
            pos += 1;
        }
        pos
    }

    fn advance_grapheme(&self, _reference: &[char], cursor: usize, grapheme: &str) -> usize {
        cursor.saturating_add(grapheme.chars().count())
    }

    fn word_end(&self, reference: &[char], start: usize) -> usize {
        let mut pos = start;
        while reference.get(pos).is_some_and(|c| !c.is_whitespace()) {
            pos += 1;
        }
        pos
    }
}
