use crate::config::GradingConfig;
use crate::error::GradingError;
use crate::matching::SentenceMatch;
use crate::pipeline::traits::{ConfidenceCombiner, ReferenceAligner};
use crate::quality::{PhonemeQuality, SentenceQuality, WordQuality};
use crate::result::{RecognitionResult, ResultDetailKind, ResultKind};
use crate::types::{GradingRequest, RecognitionOutput};

/// Grades decoded recognitions. One grader can serve many requests; each call
/// builds its own result graph.
pub struct Grader {
    config: GradingConfig,
    confidence_combiner: Box<dyn ConfidenceCombiner>,
    reference_aligner: Box<dyn ReferenceAligner>,
}

pub(crate) struct GraderParts {
    pub config: GradingConfig,
    pub confidence_combiner: Box<dyn ConfidenceCombiner>,
    pub reference_aligner: Box<dyn ReferenceAligner>,
}

impl Grader {
    pub(crate) fn from_parts(parts: GraderParts) -> Self {
        Self {
            config: parts.config,
            confidence_combiner: parts.confidence_combiner,
            reference_aligner: parts.reference_aligner,
        }
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    pub fn confidence_combiner(&self) -> &dyn ConfidenceCombiner {
        self.confidence_combiner.as_ref()
    }

    pub fn reference_aligner(&self) -> &dyn ReferenceAligner {
        self.reference_aligner.as_ref()
    }

    /// Grades one request. Evaluation errors come back as an `Error` result
    /// carrying the diagnostic message.
    pub fn grade(&self, request: &GradingRequest, history: &[PhonemeQuality]) -> RecognitionResult {
        match self.try_grade(request, history) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    id = request.id.as_str(),
                    error = %err,
                    "grader: evaluation failed"
                );
                let mut result = RecognitionResult::with_error(err.to_string());
                attach_recording(&mut result, &request.output);
                result
            }
        }
    }

    pub fn try_grade(
        &self,
        request: &GradingRequest,
        history: &[PhonemeQuality],
    ) -> Result<RecognitionResult, GradingError> {
        let output = &request.output;
        if output.is_empty() {
            let mut result = RecognitionResult::with_failure(request.cancelled);
            attach_recording(&mut result, output);
            return Ok(result);
        }

        let mut result = RecognitionResult {
            kind: ResultKind::Succeeded,
            sentence: SentenceMatch::new(
                output.recognized_text(),
                output.interpretation(),
                self.build_quality(output),
            ),
            ..RecognitionResult::default()
        };
        attach_recording(&mut result, output);
        if request.cancelled {
            result.mark_cancelled();
        }

        let matched = result.sentence.locate_alternative(&request.expected);
        result.update_confidence(output.interpretation(), self.confidence_combiner.as_ref())?;

        match matched.and_then(|index| request.expected.get(index)) {
            Some(reference) => {
                result.sentence.find_pronunciation_problems(
                    reference,
                    history,
                    self.reference_aligner.as_ref(),
                )?;
            }
            None => {
                if result.kind == ResultKind::Succeeded {
                    result.kind = ResultKind::Failed;
                }
                result.add_detail(ResultDetailKind::SentenceNotMatched);
            }
        }

        for detail in output.audio().details() {
            result.add_detail(detail);
        }

        tracing::debug!(
            id = request.id.as_str(),
            kind = result.kind.as_str(),
            phrase_confidence = result.sentence.quality.phrase_confidence,
            problems = result.sentence.problems.len(),
            "grader: recognition graded"
        );
        Ok(result)
    }

    /// Quality model of the decoded output, word acceptance included.
    pub fn build_quality(&self, output: &RecognitionOutput) -> SentenceQuality {
        let words = output
            .words()
            .iter()
            .enumerate()
            .map(|(idx, word)| {
                let phone_count = output
                    .word_phonemes(idx)
                    .iter()
                    .map(PhonemeQuality::from)
                    .filter(PhonemeQuality::is_included)
                    .count();
                WordQuality::evaluate(word, phone_count, &self.config)
            })
            .collect();

        SentenceQuality {
            frame_count: output.frame_count(),
            confidence: output.confidence(),
            score: output.score(),
            words,
            phonemes: output.phonemes().iter().map(PhonemeQuality::from).collect(),
            ..SentenceQuality::new(&self.config)
        }
    }
}

fn attach_recording(result: &mut RecognitionResult, output: &RecognitionOutput) {
    result.recognition_time_ms = output.recognition_time_ms();
    result.queued_time_ms = output.queued_time_ms();
    result.recorded_file_name = output.recorded_file_name().map(str::to_string);
    result.recorded_file_type = output.recorded_file_type().map(str::to_string);
    result.audio_measure = output.audio().clone();
}
