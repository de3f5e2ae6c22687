use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use transcript_eval::{
    build_report, compute_case_report, load_cases, EvalConfig, Evaluator, EvaluatorBuilder,
};

#[path = "eval_report/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Parser)]
#[command(name = "eval_report")]
#[command(about = "Score transcripts against references and clean raw transcripts")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a JSON array of cases and write a corpus report.
    Score {
        #[arg(long, env = "EVAL_REPORT_CASES")]
        cases: PathBuf,
        #[arg(long, env = "EVAL_REPORT_CONFIG")]
        config: Option<PathBuf>,
        #[arg(long, env = "EVAL_REPORT_OUT")]
        out: Option<PathBuf>,
    },
    /// Clean one raw transcript and print the cleaning result.
    Clean {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        preset: Option<String>,
        #[arg(long, env = "EVAL_REPORT_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    match args.command {
        Command::Score { cases, config, out } => score(&cases, config.as_deref(), out.as_deref()),
        Command::Clean {
            input,
            preset,
            config,
        } => clean(&input, preset.as_deref(), config.as_deref()),
    }
}

fn score(cases_path: &Path, config_path: Option<&Path>, out: Option<&Path>) -> Result<(), String> {
    let evaluator = build_evaluator(config_path)?;
    let cases = load_cases(cases_path)
        .map_err(|err| format!("Failed to load cases '{}': {err}", cases_path.display()))?;
    if cases.is_empty() {
        return Err(format!("No cases in '{}'.", cases_path.display()));
    }

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("starting...");

    let mut case_reports = Vec::with_capacity(cases.len());
    for case in &cases {
        progress.set_message(case.id.clone());
        let report = compute_case_report(&evaluator, case)
            .map_err(|err| format!("{}: scoring failed: {err}", case.id))?;
        case_reports.push(report);
        progress.inc(1);
    }
    progress.finish_with_message("done");

    let report = build_report(&evaluator, case_reports, Utc::now().to_rfc3339());
    tracing::info!(
        cases = report.meta.case_count,
        wer = report.aggregates.global.wer,
        custom_wer = report.aggregates.global.custom_wer,
        cer = report.aggregates.global.cer,
        "corpus scored"
    );

    let out_path = resolve_out_path(out);
    json_report_formatter::write_json(&out_path, &report)?;
    tracing::info!(path = %out_path.display(), "report written");
    Ok(())
}

fn clean(input: &Path, preset: Option<&str>, config_path: Option<&Path>) -> Result<(), String> {
    let evaluator = build_evaluator(config_path)?;
    let raw = fs::read_to_string(input)
        .map_err(|err| format!("Failed to read transcript '{}': {err}", input.display()))?;
    let preset = preset.unwrap_or(evaluator.config().default_preset.as_str());
    let result = evaluator
        .clean(&raw, preset)
        .map_err(|err| format!("Cleaning '{}' failed: {err}", input.display()))?;
    json_report_formatter::print_json(&result)
}

fn build_evaluator(config_path: Option<&Path>) -> Result<Evaluator, String> {
    let config = match config_path {
        Some(path) => EvalConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => EvalConfig::default(),
    };
    EvaluatorBuilder::new(config)
        .build()
        .map_err(|err| format!("Failed to build evaluator: {err}"))
}

fn resolve_out_path(out: Option<&Path>) -> PathBuf {
    if let Some(path) = out {
        return path.to_path_buf();
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    PathBuf::from("target")
        .join("eval_reports")
        .join(format!("eval-report-{run_id}.json"))
}
