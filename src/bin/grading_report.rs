use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use pronunciation_grader::{
    build_report, compute_result_report, GraderBuilder, GradingConfig, GradingRequest,
    PhonemeQuality,
};
use tracing_subscriber::EnvFilter;

#[path = "grading_report/json_report_formatter.rs"]
mod json_report_formatter;
#[path = "grading_report/text_report_formatter.rs"]
mod text_report_formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "grading_report")]
#[command(about = "Grade decoded recognitions and report pronunciation problems")]
struct Args {
    /// JSON array of grading requests.
    #[arg(long, env = "GRADER_REQUESTS")]
    requests: PathBuf,
    /// JSON array of previously scored phonemes.
    #[arg(long, env = "GRADER_HISTORY")]
    history: Option<PathBuf>,
    #[arg(long, env = "GRADER_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "GRADER_OUT")]
    out: Option<PathBuf>,
    #[arg(
        long,
        env = "GRADER_FORMAT",
        value_enum,
        default_value_t = OutputFormat::Json
    )]
    output_format: OutputFormat,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();

    let config = match args.config.as_deref() {
        Some(path) => GradingConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => GradingConfig::default(),
    };
    let grader = GraderBuilder::new(config.clone())
        .build()
        .map_err(|err| format!("Failed to build grader: {err}"))?;

    let requests: Vec<GradingRequest> = read_json(&args.requests, "requests")?;
    let history: Vec<PhonemeQuality> = match args.history.as_deref() {
        Some(path) => read_json(path, "history")?,
        None => Vec::new(),
    };
    tracing::info!(
        requests = requests.len(),
        history = history.len(),
        "grading_report: grading requests"
    );

    let mut results = Vec::with_capacity(requests.len());
    let mut reports = Vec::with_capacity(requests.len());
    for (idx, request) in requests.iter().enumerate() {
        let id = if request.id.is_empty() {
            format!("request-{idx}")
        } else {
            request.id.clone()
        };
        let result = grader.grade(request, &history);
        reports.push(compute_result_report(&id, &result));
        results.push((id, result));
    }
    let report = build_report(&config, history.len(), reports);

    match args.output_format {
        OutputFormat::Json => match args.out.as_deref() {
            Some(path) => json_report_formatter::write_report(path, &report)?,
            None => println!("{}", json_report_formatter::render_report(&report)?),
        },
        OutputFormat::Text => {
            let text = text_report_formatter::render_report(&results, &report);
            match args.out.as_deref() {
                Some(path) => text_report_formatter::write_text(path, &text)?,
                None => print!("{text}"),
            }
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T, String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {what} file '{}': {err}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|err| format!("Failed to parse {what} file '{}': {err}", path.display()))
}
