use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use pronunciation_grader::{GradingReport, RecognitionResult};

pub fn render_report(results: &[(String, RecognitionResult)], report: &GradingReport) -> String {
    let mut out = String::new();
    for (id, result) in results {
        let _ = writeln!(out, "== {id}");
        out.push_str(&result.format_report());
        out.push('\n');
    }

    let aggregates = &report.aggregates;
    let counts = &aggregates.counts;
    let _ = writeln!(out, "== summary ({})", report.meta.generated_at);
    let _ = writeln!(
        out,
        "total {} | succeeded {} | failed {} | error {} | available {} | unavailable {}",
        counts.total,
        counts.succeeded,
        counts.failed,
        counts.error,
        counts.available,
        counts.unavailable
    );
    let _ = writeln!(
        out,
        "acceptance {:.1}%",
        aggregates.acceptance_ratio * 100.0
    );
    if let Some(distribution) = aggregates.phrase_confidence.as_ref() {
        let _ = writeln!(
            out,
            "phrase confidence mean {:.1} | p50 {:.1} | p90 {:.1} | min {:.0} | max {:.0}",
            distribution.mean, distribution.p50, distribution.p90, distribution.min, distribution.max
        );
    }
    if !aggregates.problem_phones.is_empty() {
        let phones = aggregates
            .problem_phones
            .iter()
            .map(|entry| format!("{}x{}", entry.phone, entry.count))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "problem phones {phones}");
    }
    out
}

pub fn write_text(path: &Path, text: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create report output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    fs::write(path, text)
        .map_err(|err| format!("Failed to write report file '{}': {err}", path.display()))
}
