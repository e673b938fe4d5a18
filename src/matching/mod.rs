use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GradingError;
use crate::pipeline::traits::{ConfidenceCombiner, ReferenceAligner};
use crate::quality::{PhonemeQuality, SentenceQuality, WordQuality};

pub mod confidence;
mod problems;
mod word_span;


pub use confidence::{evaluate_confidence, MIN_CONFIDENCE};
pub use word_span::matched_word_range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemKind {
    Grapheme,
    Word,
}

/// A grapheme (or whole word) of the reference sentence the learner should
/// work on. `offset` counts characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PronunciationProblem {
    #[serde(rename = "Type")]
    pub kind: ProblemKind,
    pub grapheme: String,
    pub phoneme: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SentenceMatch {
    pub recognized_text: String,
    pub interpretation: String,
    #[serde(
        serialize_with = "serialize_matched_index",
        deserialize_with = "deserialize_matched_index"
    )]
    pub matched_index: Option<usize>,
    pub quality: SentenceQuality,
    #[serde(rename = "PronunciationProblem")]
    pub problems: Vec<PronunciationProblem>,
}

impl SentenceMatch {
    pub fn new(
        recognized_text: impl Into<String>,
        interpretation: impl Into<String>,
        quality: SentenceQuality,
    ) -> Self {
        Self {
            recognized_text: recognized_text.into(),
            interpretation: interpretation.into(),
            matched_index: None,
            quality,
            problems: Vec::new(),
        }
    }

    /// Picks the expected sentence the recognition corresponds to.
    ///
    /// An alternative equal to the interpretation wins; failing that, the first
    /// alternative contained in the recognized text. Comparison ignores case
    /// and repeated whitespace.
    pub fn locate_alternative<S: AsRef<str>>(&mut self, alternatives: &[S]) -> Option<usize> {
        let interpretation = normalize(&self.interpretation);
        let recognized = normalize(&self.recognized_text);
        let normalized: Vec<String> = alternatives
            .iter()
            .map(|alternative| normalize(alternative.as_ref()))
            .collect();

        let matched = normalized
            .iter()
            .position(|alternative| !alternative.is_empty() && *alternative == interpretation)
            .or_else(|| {
                normalized.iter().position(|alternative| {
                    !alternative.is_empty() && contains_words(&recognized, alternative)
                })
            });
        tracing::debug!(
            interpretation = self.interpretation.as_str(),
            alternatives = alternatives.len(),
            matched_index = ?matched,
            "matching: located expected alternative"
        );
        self.matched_index = matched;
        matched
    }

    /// Word records covering `matched_text` within the recognized text.
    pub fn find_matched_words(&self, matched_text: &str) -> Result<&[WordQuality], GradingError> {
        let range = matched_word_range(&self.recognized_text, matched_text)?;
        self.quality.words.get(range.clone()).ok_or_else(|| {
            GradingError::shape_mismatch(
                "matched word span vs word records",
                range.end,
                self.quality.words.len(),
            )
        })
    }

    /// Blends the confidences of the matched words into the phrase confidence
    /// and reports whether the sentence is now accepted.
    pub fn update_confidence(
        &mut self,
        matched_text: &str,
        combiner: &dyn ConfidenceCombiner,
    ) -> Result<bool, GradingError> {
        let phrase_confidence = combiner.combine(self.find_matched_words(matched_text)?)?;
        self.quality.phrase_confidence = phrase_confidence;
        let accepted = self.quality.recognition_accepted();
        tracing::debug!(
            matched_text,
            phrase_confidence,
            confidence = self.quality.confidence,
            accepted,
            "matching: phrase confidence updated"
        );
        Ok(accepted)
    }

    /// Scans words and phonemes against `reference` and stores the problems
    /// found. An empty history yields no problems.
    ///
    /// Fails with `ShapeMismatch` when the phoneme word segments do not pair
    /// up with the word records; the stored problems are cleared.
    pub fn find_pronunciation_problems(
        &mut self,
        reference: &str,
        history: &[PhonemeQuality],
        aligner: &dyn ReferenceAligner,
    ) -> Result<&[PronunciationProblem], GradingError> {
        self.problems.clear();
        let problems = problems::scan(self, reference, history, aligner)?;
        self.problems = problems;
        Ok(&self.problems)
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn contains_words(haystack: &str, needle: &str) -> bool {
    format!(" {haystack} ").contains(&format!(" {needle} "))
}

fn serialize_matched_index<S: Serializer>(
    value: &Option<usize>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let index = value
        .and_then(|index| i64::try_from(index).ok())
        .unwrap_or(-1);
    serializer.serialize_i64(index)
}

fn deserialize_matched_index<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<usize>, D::Error> {
    let index = i64::deserialize(deserializer)?;
    Ok(usize::try_from(index).ok())
}
