use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::config::GradingConfig;
use crate::error::GradingError;
use crate::matching::{ProblemKind, PronunciationProblem};
use crate::result::{RecognitionResult, ResultDetailKind, ResultKind};

pub const SCHEMA_VERSION: u32 = 1;
const TOP_PROBLEM_PHONES: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct GradingReport {
    pub schema_version: u32,
    pub meta: Meta,
    pub results: Vec<ResultReport>,
    pub aggregates: AggregateReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub request_count: usize,
    pub history_size: usize,
    pub config: GradingConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultReport {
    pub id: String,
    pub kind: ResultKind,
    pub details: Vec<ResultDetailKind>,
    pub needs_save: bool,
    pub was_cancelled: bool,
    pub recognized_text: String,
    pub matched_index: Option<usize>,
    pub confidence: i32,
    pub phrase_confidence: i32,
    pub rejected_word_count: u32,
    pub measures: String,
    pub problems: Vec<PronunciationProblem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub counts: KindCounts,
    pub acceptance_ratio: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phrase_confidence: Option<MetricDistribution>,
    pub problem_phones: Vec<PhoneFrequency>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub total: u32,
    pub unavailable: u32,
    pub available: u32,
    pub error: u32,
    pub failed: u32,
    pub succeeded: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricDistribution {
    pub mean: f32,
    pub min: f32,
    pub p50: f32,
    pub p90: f32,
    pub max: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneFrequency {
    pub phone: String,
    pub count: u32,
}

impl RecognitionResult {
    /// Human-readable multi-line summary of the result.
    pub fn format_report(&self) -> String {
        let mut out = String::new();
        let sentence = &self.sentence;
        let quality = &sentence.quality;

        let _ = writeln!(out, "Type: {}", self.kind.as_str());
        let details = if self.details.is_empty() {
            "-".to_string()
        } else {
            self.details
                .iter()
                .map(|detail| detail.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(out, "Details: {details}");
        if !self.message.is_empty() {
            let _ = writeln!(out, "Message: {}", self.message);
        }

        if !sentence.recognized_text.is_empty() {
            let matched = sentence
                .matched_index
                .map(|index| format!("match #{index}"))
                .unwrap_or_else(|| "no match".to_string());
            let _ = writeln!(
                out,
                "Recognized: \"{}\" ({matched})",
                sentence.recognized_text
            );
            let _ = writeln!(
                out,
                "Confidence: {} (>= {}), phrase {} (>= {})",
                quality.confidence,
                quality.sentence_acceptance_threshold,
                quality.phrase_confidence,
                quality.phrase_acceptance_threshold
            );
            let _ = writeln!(out, "Measures: {}", quality.format_measures());
        }

        if !sentence.problems.is_empty() {
            let _ = writeln!(out, "Problems:");
            for problem in &sentence.problems {
                let kind = match problem.kind {
                    ProblemKind::Grapheme => "grapheme",
                    ProblemKind::Word => "word",
                };
                let _ = writeln!(
                    out,
                    "  @{} {} /{}/ ({kind})",
                    problem.offset, problem.grapheme, problem.phoneme
                );
            }
        }

        let _ = writeln!(
            out,
            "Timing: recognized in {} ms, queued {} ms",
            self.recognition_time_ms, self.queued_time_ms
        );
        out
    }

    pub fn to_json(&self) -> Result<String, GradingError> {
        serde_json::to_string_pretty(self).map_err(|e| GradingError::json("serialize result", e))
    }

    pub fn to_xml(&self) -> Result<String, GradingError> {
        quick_xml::se::to_string(self).map_err(|e| GradingError::xml("serialize result", e))
    }
}

pub fn compute_result_report(id: &str, result: &RecognitionResult) -> ResultReport {
    let quality = &result.sentence.quality;
    ResultReport {
        id: id.to_string(),
        kind: result.kind,
        details: result.details.clone(),
        needs_save: result.needs_save(),
        was_cancelled: result.was_cancelled(),
        recognized_text: result.sentence.recognized_text.clone(),
        matched_index: result.sentence.matched_index,
        confidence: quality.confidence,
        phrase_confidence: quality.phrase_confidence,
        rejected_word_count: to_u32(quality.words.iter().filter(|w| !w.accepted).count()),
        measures: quality.format_measures(),
        problems: result.sentence.problems.clone(),
        message: (!result.message.is_empty()).then(|| result.message.clone()),
    }
}

pub fn aggregate_reports(results: &[ResultReport]) -> AggregateReport {
    let mut counts = KindCounts {
        total: to_u32(results.len()),
        ..KindCounts::default()
    };
    for result in results {
        match result.kind {
            ResultKind::Unavailable => counts.unavailable += 1,
            ResultKind::Available => counts.available += 1,
            ResultKind::Error => counts.error += 1,
            ResultKind::Failed => counts.failed += 1,
            ResultKind::Succeeded => counts.succeeded += 1,
        }
    }

    let graded = counts.failed + counts.succeeded;
    let acceptance_ratio = if graded == 0 {
        0.0
    } else {
        counts.succeeded as f32 / graded as f32
    };

    let phrase_confidences: Vec<f64> = results
        .iter()
        .filter(|result| result.needs_save && !result.recognized_text.is_empty())
        .map(|result| f64::from(result.phrase_confidence))
        .collect();

    AggregateReport {
        counts,
        acceptance_ratio,
        phrase_confidence: distribution_or_none(&phrase_confidences),
        problem_phones: problem_phone_frequencies(results, TOP_PROBLEM_PHONES),
    }
}

pub fn build_report(
    config: &GradingConfig,
    history_size: usize,
    results: Vec<ResultReport>,
) -> GradingReport {
    let aggregates = aggregate_reports(&results);
    GradingReport {
        schema_version: SCHEMA_VERSION,
        meta: Meta {
            generated_at: chrono::Utc::now().to_rfc3339(),
            request_count: results.len(),
            history_size,
            config: config.clone(),
        },
        results,
        aggregates,
    }
}

fn problem_phone_frequencies(results: &[ResultReport], top_n: usize) -> Vec<PhoneFrequency> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for problem in results.iter().flat_map(|result| result.problems.iter()) {
        if problem.kind == ProblemKind::Grapheme {
            *counts.entry(problem.phoneme.as_str()).or_default() += 1;
        }
    }
    let mut ranked: Vec<PhoneFrequency> = counts
        .into_iter()
        .map(|(phone, count)| PhoneFrequency {
            phone: phone.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.phone.cmp(&b.phone)));
    ranked.truncate(top_n);
    ranked
}

fn distribution_or_none(values: &[f64]) -> Option<MetricDistribution> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(MetricDistribution {
        mean: (sorted.iter().sum::<f64>() / sorted.len() as f64) as f32,
        min: sorted[0] as f32,
        p50: percentile_sorted(&sorted, 0.5) as f32,
        p90: percentile_sorted(&sorted, 0.9) as f32,
        max: sorted[sorted.len() - 1] as f32,
    })
}

fn percentile_sorted(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }

    let clamped = percentile.clamp(0.0, 1.0);
    let max_index = (sorted_values.len() - 1) as f64;
    let rank = clamped * max_index;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted_values[lower]
    } else {
        let weight = rank - lower as f64;
        sorted_values[lower] * (1.0 - weight) + sorted_values[upper] * weight
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
