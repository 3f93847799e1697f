//! pdfstitch - Collect PDF files, put them in order and merge them into one.

mod cli;
mod shell;

use clap::Parser;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::shell::Shell;
use pdfstitch::config::Config;
use pdfstitch::controller::Controller;
use pdfstitch::engine::LopdfEngine;
use pdfstitch::error::StitchError;
use pdfstitch::io::{FileSink, InputLoader, expand_patterns};
use pdfstitch::output::{OutputFormatter, format_bytes};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        let code = err
            .downcast_ref::<StitchError>()
            .map_or(1, StitchError::exit_code);
        process::exit(code);
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the verbosity flags.
fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> anyhow::Result<()> {
    cli.validate()?;
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_config(&config);

    let controller = Arc::new(Controller::new(
        LopdfEngine::from_config(&config),
        FileSink::from_config(&config),
    ));

    if !cli.inputs.is_empty() {
        load_inputs(&controller, &cli.inputs, &config, &formatter).await?;
    }

    let outcome = if cli.interactive {
        Shell::new(Arc::clone(&controller), formatter.clone(), config.effective_jobs())
            .run()
            .await
    } else {
        merge(&controller, &config, &formatter).await
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
    }

    outcome
}

/// Read the inputs named on the command line into the collection.
///
/// Any file that cannot be read stops the run before anything is merged.
async fn load_inputs(
    controller: &Controller,
    patterns: &[String],
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<(), StitchError> {
    let paths = expand_patterns(patterns)?;
    formatter.debug(&format!("Reading {} file(s)...", paths.len()));

    let inputs = InputLoader::new()
        .load_all(&paths, config.effective_jobs())
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let report = controller.add(inputs)?;
    if report.rejected > 0
        && let Some(message) = controller.last_error()
    {
        formatter.warning(&message);
    }

    formatter.debug(&format!(
        "{} PDF(s) queued, {} skipped",
        report.accepted, report.rejected
    ));
    Ok(())
}

/// Merge the collection once and report the result.
async fn merge(
    controller: &Controller,
    config: &Config,
    formatter: &OutputFormatter,
) -> anyhow::Result<()> {
    let snapshot = controller.snapshot();
    formatter.info(&format!("Merging {} document(s)...", snapshot.candidates.len()));

    for (index, candidate) in snapshot.candidates.iter().enumerate() {
        formatter.detail(
            &format!("{:>3}", index + 1),
            &format!("{} ({})", candidate.name, format_bytes(candidate.size, 2)),
        );
    }

    let receipt = controller.merge_and_export().await?;

    formatter.success(&format!(
        "Saved {} ({})",
        receipt.location,
        format_bytes(receipt.size, 2)
    ));

    if formatter.is_verbose() {
        formatter.section("Statistics");
        formatter.detail("Input files", &receipt.documents.to_string());
        formatter.detail("Input size", &format_bytes(snapshot.total_size(), 2));
        formatter.detail("Output size", &format_bytes(receipt.size, 2));
        formatter.detail("Compression", &format!("{:?}", config.compression));
    }

    Ok(())
}
