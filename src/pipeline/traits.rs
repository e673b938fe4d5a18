use crate::error::GradingError;
use crate::quality::WordQuality;

/// Turns the word records of a matched span into one phrase confidence.
pub trait ConfidenceCombiner: Send + Sync {
    fn combine(&self, words: &[WordQuality]) -> Result<i32, GradingError>;
}

/// Maps the phoneme stream onto character offsets of the reference sentence.
///
/// Offsets are character indices into `reference`.
pub trait ReferenceAligner: Send + Sync {
    /// Offset where the next word starts, searching from `cursor`. Only
    /// called between words; the first word starts at offset 0.
    fn next_word_start(&self, reference: &[char], cursor: usize) -> usize;

    /// Offset following `grapheme` when it is read at `cursor`.
    fn advance_grapheme(&self, reference: &[char], cursor: usize, grapheme: &str) -> usize;

    /// Offset just past the word that starts at `start`.
    fn word_end(&self, reference: &[char], start: usize) -> usize;
}
