pub mod config;
pub mod error;
pub mod matching;
pub mod pipeline;
pub mod quality;
pub mod report;
pub mod result;
pub mod types;

pub use config::GradingConfig;
pub use error::GradingError;
pub use matching::{evaluate_confidence, ProblemKind, PronunciationProblem, SentenceMatch};
pub use pipeline::builder::GraderBuilder;
pub use pipeline::defaults::{PositionalAligner, SigmoidConfidenceCombiner};
pub use pipeline::runtime::Grader;
pub use pipeline::traits::{ConfidenceCombiner, ReferenceAligner};
pub use quality::{average_score, PhonemeQuality, SentenceQuality, WordQuality};
pub use report::{
    aggregate_reports, build_report, compute_result_report, AggregateReport, GradingReport, Meta,
    ResultReport,
};
pub use result::{AudioQuality, RecognitionResult, ResultDetailKind, ResultKind};
pub use types::{
    GradingRequest, PhonemeScore, RecognitionOutput, RecognitionOutputBuilder, WordScore,
};
