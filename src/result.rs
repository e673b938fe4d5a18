use serde::{Deserialize, Serialize};

use crate::error::GradingError;
use crate::matching::SentenceMatch;
use crate::pipeline::traits::ConfidenceCombiner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResultKind {
    #[default]
    Unavailable,
    Available,
    Error,
    Failed,
    Succeeded,
}

impl ResultKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "Unavailable",
            Self::Available => "Available",
            Self::Error => "Error",
            Self::Failed => "Failed",
            Self::Succeeded => "Succeeded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultDetailKind {
    RecognitionCancelled,
    NoSpeechDetected,
    ConfidenceWasTooLow,
    SentenceNotMatched,
    MissingFile,
    InvalidGrammar,
    EngineError,
    AudioClipping,
    SpeechTruncated,
}

impl ResultDetailKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RecognitionCancelled => "RecognitionCancelled",
            Self::NoSpeechDetected => "NoSpeechDetected",
            Self::ConfidenceWasTooLow => "ConfidenceWasTooLow",
            Self::SentenceNotMatched => "SentenceNotMatched",
            Self::MissingFile => "MissingFile",
            Self::InvalidGrammar => "InvalidGrammar",
            Self::EngineError => "EngineError",
            Self::AudioClipping => "AudioClipping",
            Self::SpeechTruncated => "SpeechTruncated",
        }
    }
}

/// Signal measures the engine reports alongside the recognition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AudioQuality {
    pub peak_level: i32,
    pub noise_level: i32,
    pub signal_noise_ratio: i32,
    pub clipping: bool,
    pub truncated: bool,
}

impl AudioQuality {
    pub fn details(&self) -> Vec<ResultDetailKind> {
        let mut details = Vec::new();
        if self.clipping {
            details.push(ResultDetailKind::AudioClipping);
        }
        if self.truncated {
            details.push(ResultDetailKind::SpeechTruncated);
        }
        details
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecognitionResult {
    #[serde(rename = "Type")]
    pub kind: ResultKind,
    #[serde(rename = "ResultDetail")]
    pub details: Vec<ResultDetailKind>,
    pub message: String,
    #[serde(rename = "RecognitionTime")]
    pub recognition_time_ms: u64,
    #[serde(rename = "QueuedTime")]
    pub queued_time_ms: u64,
    pub recorded_file_name: Option<String>,
    pub recorded_file_type: Option<String>,
    pub audio_measure: AudioQuality,
    pub sentence: SentenceMatch,
}

impl RecognitionResult {
    fn of_kind(kind: ResultKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_available() -> Self {
        Self::of_kind(ResultKind::Available)
    }

    pub fn with_missing_file(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            details: vec![ResultDetailKind::MissingFile],
            message: format!("recorded file '{file_name}' was not found"),
            recorded_file_name: Some(file_name),
            ..Self::of_kind(ResultKind::Error)
        }
    }

    pub fn with_invalid_grammar(message: impl Into<String>) -> Self {
        Self {
            details: vec![ResultDetailKind::InvalidGrammar],
            message: message.into(),
            ..Self::of_kind(ResultKind::Error)
        }
    }

    /// Failed recognition. A cancellation is always recorded as the first detail.
    pub fn with_failure(cancelled: bool) -> Self {
        let detail = if cancelled {
            ResultDetailKind::RecognitionCancelled
        } else {
            ResultDetailKind::NoSpeechDetected
        };
        Self {
            details: vec![detail],
            ..Self::of_kind(ResultKind::Failed)
        }
    }

    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            details: vec![ResultDetailKind::EngineError],
            message: message.into(),
            ..Self::of_kind(ResultKind::Error)
        }
    }

    /// Only finished recognitions are persisted by the caller.
    pub fn needs_save(&self) -> bool {
        matches!(self.kind, ResultKind::Succeeded | ResultKind::Failed)
    }

    pub fn was_cancelled(&self) -> bool {
        self.details.first() == Some(&ResultDetailKind::RecognitionCancelled)
    }

    pub fn is_accepted(&self) -> bool {
        self.kind == ResultKind::Succeeded
    }

    pub fn add_detail(&mut self, detail: ResultDetailKind) {
        if !self.details.contains(&detail) {
            self.details.push(detail);
        }
    }

    /// Marks the result cancelled, keeping the cancellation detail first.
    pub fn mark_cancelled(&mut self) {
        self.details
            .retain(|detail| *detail != ResultDetailKind::RecognitionCancelled);
        self.details.insert(0, ResultDetailKind::RecognitionCancelled);
        if self.kind == ResultKind::Succeeded {
            self.kind = ResultKind::Failed;
        }
    }

    /// Recomputes the phrase confidence of the sentence from the words covering
    /// `matched_text`. A rejected sentence turns a success into a failure.
    pub fn update_confidence(
        &mut self,
        matched_text: &str,
        combiner: &dyn ConfidenceCombiner,
    ) -> Result<bool, GradingError> {
        let accepted = self.sentence.update_confidence(matched_text, combiner)?;
        self.apply_acceptance(accepted);
        Ok(accepted)
    }

    pub(crate) fn apply_acceptance(&mut self, accepted: bool) {
        if accepted {
            return;
        }
        if self.kind == ResultKind::Succeeded {
            self.kind = ResultKind::Failed;
        }
        if self.kind == ResultKind::Failed {
            self.add_detail(ResultDetailKind::ConfidenceWasTooLow);
        }
    }
}
