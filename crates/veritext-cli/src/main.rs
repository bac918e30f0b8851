//! veritext: extract structured, evidence-backed records from free text and
//! validate them deterministically.
//!
//! Exit status reflects setup only: bad arguments, unreadable input, a
//! broken profile, or a missing API key fail the process. Individual records
//! that fail extraction or validation are reported in the output, not via
//! the exit code.

use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use veritext_core::{Profile, Validator};
use veritext_runtime::{
    CompletionConfig, Extractor, LlmProposer, OpenAiProvider, Pipeline, ProposalCache, Report,
    RunSummary, DEFAULT_CONCURRENCY,
};

#[derive(Parser, Debug)]
#[command(
    name = "veritext",
    version,
    about = "Evidence-backed text extraction with deterministic validation"
)]
struct Args {
    /// Input file: one record per blank-line-separated block
    #[arg(long = "in", value_name = "FILE")]
    input: PathBuf,

    /// Output file for the JSON report array (stdout if omitted)
    #[arg(long = "out", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Extraction profile (YAML): schema plus validation rules
    #[arg(long, value_name = "FILE")]
    profile: PathBuf,

    /// Model to use for extraction
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// Concurrent extraction requests
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Per-request timeout (e.g. "30s", "2m")
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    timeout: Duration,
}

/// Split an input file into records on blank lines.
///
/// Lines inside a record keep their internal whitespace; leading and
/// trailing blank lines are ignored, as are runs of blank lines between
/// records.
fn split_records(input: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();

    for line in input.lines() {
        if line.trim().is_empty() {
            if !current.trim().is_empty() {
                records.push(current.trim_end().to_string());
            }
            current.clear();
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    if !current.trim().is_empty() {
        records.push(current.trim_end().to_string());
    }
    records
}

fn write_reports(output: Option<&PathBuf>, reports: &[Report]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    match output {
        Some(path) => std::fs::write(path, json.as_bytes())
            .with_context(|| format!("failed to write output to {}", path.display()))?,
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(json.as_bytes())?;
            handle.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let profile = Profile::from_yaml_file(&args.profile)
        .with_context(|| format!("failed to load profile {}", args.profile.display()))?;
    tracing::info!(profile = %profile.name, fields = profile.schema.len(), "profile loaded");

    let input = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read input {}", args.input.display()))?;
    // Zero records is a normal (empty) run, not a configuration failure.
    let texts = split_records(&input);
    tracing::info!(records = texts.len(), "input split into records");

    let provider = OpenAiProvider::from_env().context("provider not configured")?;
    let proposer = LlmProposer::new(Arc::new(provider))
        .with_config(CompletionConfig {
            model: args.model.clone(),
            timeout: args.timeout,
            ..CompletionConfig::default()
        })
        .with_cache(ProposalCache::new(1024));

    let pipeline = Pipeline::new(
        Extractor::new(Arc::new(proposer)),
        Validator::new(profile.compile_rules()),
    )
    .with_concurrency(args.concurrency);

    let reports = pipeline.run(&profile.schema, texts).await;
    write_reports(args.output.as_ref(), &reports)?;

    let summary = RunSummary::of(&reports);
    eprintln!(
        "{} records: {} valid, {} invalid",
        summary.total, summary.valid, summary.invalid
    );

    Ok(())
}
