use std::ops::Range;

use serde::Deserialize;

use crate::error::GradingError;
use crate::quality::PhonemeQuality;
use crate::result::AudioQuality;

/// Engine scores for one recognized word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct WordScore {
    pub confidence: i32,
    pub score: i32,
    pub start_frame: u32,
    pub frame_count: u32,
}

/// Engine score for one phoneme slot. A blank `phone_name` is a word boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PhonemeScore {
    pub phone_name: String,
    #[serde(default)]
    pub grapheme: String,
    #[serde(default)]
    pub score: i32,
}

impl PhonemeScore {
    pub fn new(phone_name: impl Into<String>, grapheme: impl Into<String>, score: i32) -> Self {
        Self {
            phone_name: phone_name.into(),
            grapheme: grapheme.into(),
            score,
        }
    }

    pub fn boundary() -> Self {
        Self::default()
    }

    fn is_boundary(&self) -> bool {
        self.phone_name.trim().is_empty()
    }
}

impl From<&PhonemeScore> for PhonemeQuality {
    fn from(value: &PhonemeScore) -> Self {
        PhonemeQuality::new(value.phone_name.clone(), value.grapheme.clone(), value.score)
    }
}

/// Decoded engine output whose word, phoneme and text shapes agree.
///
/// Only obtainable through [`RecognitionOutputBuilder::build`] (or
/// deserialization, which runs the same checks).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RecognitionOutputBuilder")]
pub struct RecognitionOutput {
    recognized_text: String,
    interpretation: String,
    words: Vec<WordScore>,
    phonemes: Vec<PhonemeScore>,
    word_segments: Vec<Range<usize>>,
    frame_count: u32,
    confidence: i32,
    score: i32,
    audio: AudioQuality,
    recognition_time_ms: u64,
    queued_time_ms: u64,
    recorded_file_name: Option<String>,
    recorded_file_type: Option<String>,
}

impl RecognitionOutput {
    pub fn builder(recognized_text: impl Into<String>) -> RecognitionOutputBuilder {
        RecognitionOutputBuilder::new(recognized_text)
    }

    pub fn recognized_text(&self) -> &str {
        &self.recognized_text
    }

    pub fn interpretation(&self) -> &str {
        &self.interpretation
    }

    pub fn words(&self) -> &[WordScore] {
        &self.words
    }

    /// Full phoneme stream, boundary markers included.
    pub fn phonemes(&self) -> &[PhonemeScore] {
        &self.phonemes
    }

    /// Phonemes of the `word_index`-th word, without boundary markers.
    pub fn word_phonemes(&self, word_index: usize) -> &[PhonemeScore] {
        self.word_segments
            .get(word_index)
            .map(|range| &self.phonemes[range.clone()])
            .unwrap_or(&[])
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn confidence(&self) -> i32 {
        self.confidence
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn audio(&self) -> &AudioQuality {
        &self.audio
    }

    pub fn recognition_time_ms(&self) -> u64 {
        self.recognition_time_ms
    }

    pub fn queued_time_ms(&self) -> u64 {
        self.queued_time_ms
    }

    pub fn recorded_file_name(&self) -> Option<&str> {
        self.recorded_file_name.as_deref()
    }

    pub fn recorded_file_type(&self) -> Option<&str> {
        self.recorded_file_type.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.recognized_text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecognitionOutputBuilder {
    recognized_text: String,
    interpretation: Option<String>,
    words: Vec<WordScore>,
    phonemes: Vec<PhonemeScore>,
    frame_count: u32,
    confidence: i32,
    score: i32,
    audio: AudioQuality,
    recognition_time_ms: u64,
    queued_time_ms: u64,
    recorded_file_name: Option<String>,
    recorded_file_type: Option<String>,
}

impl RecognitionOutputBuilder {
    pub fn new(recognized_text: impl Into<String>) -> Self {
        Self {
            recognized_text: recognized_text.into(),
            ..Self::default()
        }
    }

    /// Portion of the recognized text the grammar matched. Defaults to the
    /// whole recognized text.
    pub fn with_interpretation(mut self, interpretation: impl Into<String>) -> Self {
        self.interpretation = Some(interpretation.into());
        self
    }

    pub fn with_word(mut self, word: WordScore) -> Self {
        self.words.push(word);
        self
    }

    pub fn with_words(mut self, words: impl IntoIterator<Item = WordScore>) -> Self {
        self.words.extend(words);
        self
    }

    pub fn with_phoneme(mut self, phoneme: PhonemeScore) -> Self {
        self.phonemes.push(phoneme);
        self
    }

    pub fn with_phonemes(mut self, phonemes: impl IntoIterator<Item = PhonemeScore>) -> Self {
        self.phonemes.extend(phonemes);
        self
    }

    pub fn with_sentence_scores(mut self, frame_count: u32, confidence: i32, score: i32) -> Self {
        self.frame_count = frame_count;
        self.confidence = confidence;
        self.score = score;
        self
    }

    pub fn with_audio(mut self, audio: AudioQuality) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_timings(mut self, recognition_time_ms: u64, queued_time_ms: u64) -> Self {
        self.recognition_time_ms = recognition_time_ms;
        self.queued_time_ms = queued_time_ms;
        self
    }

    pub fn with_recorded_file(
        mut self,
        file_name: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        self.recorded_file_name = Some(file_name.into());
        self.recorded_file_type = Some(file_type.into());
        self
    }

    pub fn build(self) -> Result<RecognitionOutput, GradingError> {
        let token_count = self.recognized_text.split_whitespace().count();
        if self.words.len() != token_count {
            return Err(GradingError::shape_mismatch(
                "word scores vs recognized text",
                token_count,
                self.words.len(),
            ));
        }

        let word_segments = segment_words(&self.phonemes);
        if word_segments.len() != self.words.len() {
            return Err(GradingError::shape_mismatch(
                "phoneme word segments vs word scores",
                self.words.len(),
                word_segments.len(),
            ));
        }

        let interpretation = self
            .interpretation
            .unwrap_or_else(|| self.recognized_text.clone());

        Ok(RecognitionOutput {
            recognized_text: self.recognized_text,
            interpretation,
            words: self.words,
            phonemes: self.phonemes,
            word_segments,
            frame_count: self.frame_count,
            confidence: self.confidence,
            score: self.score,
            audio: self.audio,
            recognition_time_ms: self.recognition_time_ms,
            queued_time_ms: self.queued_time_ms,
            recorded_file_name: self.recorded_file_name,
            recorded_file_type: self.recorded_file_type,
        })
    }
}

impl TryFrom<RecognitionOutputBuilder> for RecognitionOutput {
    type Error = GradingError;

    fn try_from(value: RecognitionOutputBuilder) -> Result<Self, Self::Error> {
        value.build()
    }
}

/// Ranges of non-boundary phonemes, one per word. Runs of consecutive
/// boundary markers count as a single separator.
fn segment_words(phonemes: &[PhonemeScore]) -> Vec<Range<usize>> {
    let mut segments = Vec::new();
    let mut start: Option<usize> = None;
    for (idx, phoneme) in phonemes.iter().enumerate() {
        match (phoneme.is_boundary(), start) {
            (true, Some(s)) => {
                segments.push(s..idx);
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }
    if let Some(s) = start {
        segments.push(s..phonemes.len());
    }
    segments
}

/// One grading call: decoded engine output plus the sentences the grammar
/// offered as acceptable answers.
#[derive(Debug, Clone, Deserialize)]
pub struct GradingRequest {
    #[serde(default)]
    pub id: String,
    pub output: RecognitionOutput,
    pub expected: Vec<String>,
    #[serde(default)]
    pub cancelled: bool,
}

impl GradingRequest {
    pub fn new(output: RecognitionOutput, expected: Vec<String>) -> Self {
        Self {
            id: String::new(),
            output,
            expected,
            cancelled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(confidence: i32) -> WordScore {
        WordScore {
            confidence,
            score: confidence,
            start_frame: 0,
            frame_count: 10,
        }
    }

    fn cat_phonemes() -> Vec<PhonemeScore> {
        vec![
            PhonemeScore::new("k", "c", 40),
            PhonemeScore::new("ae", "a", 90),
            PhonemeScore::new("t", "t", 70),
        ]
    }

    #[test]
    fn build_validates_word_count_against_text() {
        let err = RecognitionOutput::builder("the cat")
            .with_word(word(80))
            .with_phonemes(cat_phonemes())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            GradingError::ShapeMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn build_validates_phoneme_segments_against_words() {
        let err = RecognitionOutput::builder("the cat")
            .with_words([word(80), word(70)])
            .with_phonemes(cat_phonemes())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            GradingError::ShapeMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn segments_ignore_leading_trailing_and_repeated_boundaries() {
        let output = RecognitionOutput::builder("a cat")
            .with_words([word(80), word(70)])
            .with_phoneme(PhonemeScore::boundary())
            .with_phoneme(PhonemeScore::new("ax", "a", 60))
            .with_phoneme(PhonemeScore::boundary())
            .with_phoneme(PhonemeScore::boundary())
            .with_phonemes(cat_phonemes())
            .with_phoneme(PhonemeScore::boundary())
            .build()
            .expect("shapes agree");
        assert_eq!(output.word_phonemes(0).len(), 1);
        assert_eq!(output.word_phonemes(1), cat_phonemes().as_slice());
        assert!(output.word_phonemes(2).is_empty());
        assert_eq!(output.phonemes().len(), 8);
    }

    #[test]
    fn interpretation_defaults_to_recognized_text() {
        let output = RecognitionOutput::builder("cat")
            .with_word(word(80))
            .with_phonemes(cat_phonemes())
            .build()
            .expect("shapes agree");
        assert_eq!(output.interpretation(), "cat");
    }

    #[test]
    fn empty_recognition_builds_without_words() {
        let output = RecognitionOutput::builder("  ").build().expect("empty is valid");
        assert!(output.is_empty());
        assert!(output.words().is_empty());
    }

    #[test]
    fn deserialization_runs_shape_checks() {
        let ok = r#"{
            "recognized_text": "cat",
            "words": [{ "confidence": 80, "score": 70, "start_frame": 0, "frame_count": 12 }],
            "phonemes": [
                { "phone_name": "k", "grapheme": "c", "score": 40 },
                { "phone_name": "" }
            ],
            "confidence": 75
        }"#;
        let output: RecognitionOutput = serde_json::from_str(ok).expect("valid output json");
        assert_eq!(output.confidence(), 75);
        assert_eq!(output.word_phonemes(0).len(), 1);

        let bad = r#"{ "recognized_text": "the cat", "words": [] }"#;
        assert!(serde_json::from_str::<RecognitionOutput>(bad).is_err());
    }
}
