//! pdfmark command line
//!
//! Thin wrapper over `pdfmark-core`: argument parsing, configuration,
//! logging and the external conversion round trip.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod config;
mod converter;
mod report;

use cli::{Cli, Commands};
use commands::Settings;
use config::Config;
use report::ErrorOutput;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so --json output on stdout stays parseable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting pdfmark v{}", env!("CARGO_PKG_VERSION"));

    let json = cli.json;
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            report_error(&e, json);
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` when a verification step did not find the pattern.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = Config::load(cli.config.as_deref())?;
    let settings = Settings {
        config,
        json: cli.json,
    };

    match cli.command {
        Commands::Pattern { payload, offset } => {
            commands::show_pattern(&settings, payload.as_deref(), offset)?;
            Ok(true)
        }
        Commands::Inject {
            input,
            output,
            payload,
            offset,
        } => {
            commands::inject(&settings, &input, &output, payload.as_deref(), offset)?;
            Ok(true)
        }
        Commands::Verify {
            input,
            payload,
            expected_offset,
        } => commands::verify(&settings, &input, payload.as_deref(), expected_offset),
        Commands::Analyze { input } => {
            commands::analyze_command(&settings, &input)?;
            Ok(true)
        }
        Commands::Roundtrip {
            input,
            output,
            payload,
            offset,
            keep_temp,
        } => commands::roundtrip(
            &settings,
            &input,
            &output,
            payload.as_deref(),
            offset,
            keep_temp,
        ),
    }
}

fn report_error(e: &anyhow::Error, json: bool) {
    let causes: Vec<String> = e.chain().skip(1).map(|c| c.to_string()).collect();
    if json {
        let payload = ErrorOutput {
            success: false,
            error: e.to_string(),
            causes,
        };
        match serde_json::to_string_pretty(&payload) {
            Ok(s) => println!("{}", s),
            Err(_) => eprintln!("Error: {}", e),
        }
    } else {
        eprintln!("Error: {}", e);
        for cause in causes {
            eprintln!("  Caused by: {}", cause);
        }
    }
}
