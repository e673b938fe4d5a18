use thiserror::Error;

#[derive(Debug, Error)]
pub enum GradingError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("XML error while {context}: {message}")]
    Xml {
        context: &'static str,
        message: String,
    },
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("matched text '{matched_text}' not found in recognized text")]
    NoMatch { matched_text: String },
    #[error("matched words carry no phones; phrase confidence is undefined")]
    EmptyPhoneSpan,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl GradingError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn xml(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Xml {
            context,
            message: err.to_string(),
        }
    }

    pub(crate) fn shape_mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            context,
            expected,
            actual,
        }
    }

    pub(crate) fn no_match(matched_text: impl Into<String>) -> Self {
        Self::NoMatch {
            matched_text: matched_text.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
