//! Operator CLI for the intake gateway.
//!
//! Usage:
//!   intake-gateway anonymize --text "Herr Meier, Tel. 079 123 45 67"
//!   intake-gateway analyze --type summarize --file note.txt
//!   intake-gateway providers --probe
//!
//! Configuration comes from the environment (and an optional `.env`).

use ai_provider_chain::{AnalysisOptions, AnalysisType};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use intake_gateway::{build_runtime, GatewayConfig, IntakeService};
use logger_redacted::init_logging;
use serde_json::json;
use std::path::PathBuf;
use telemetry::install_prometheus_exporter;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "intake-gateway")]
#[command(about = "Anonymize medical text and run AI analysis with provider fallback")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Anonymize text and print the redacted text with its entities
    Anonymize {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Anonymize text, then analyze it through the provider chain
    Analyze {
        /// summarize, extract-symptoms, suggest-diagnosis,
        /// extract-medications, extract-procedures or general-query
        #[arg(long = "type", default_value = "summarize")]
        analysis_type: AnalysisType,

        #[command(flatten)]
        input: InputArgs,

        /// Tell the provider the text is Swiss German
        #[arg(long)]
        swiss_german: bool,

        /// Override the provider model
        #[arg(long)]
        model: Option<String>,

        #[arg(long, default_value = "1000")]
        max_tokens: u32,
    },

    /// Transcribe an audio file and print the anonymized transcript
    Transcribe {
        /// Audio file (wav, mp3, m4a, ...)
        #[arg(long)]
        file: PathBuf,
    },

    /// Show the provider chain
    Providers {
        /// Probe every provider for availability
        #[arg(long)]
        probe: bool,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Text given inline
    #[arg(long)]
    text: Option<String>,

    /// Read the text from a file
    #[arg(long)]
    file: Option<PathBuf>,
}

impl InputArgs {
    fn read(&self) -> anyhow::Result<String> {
        match (&self.text, &self.file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
            (None, None) => anyhow::bail!("Either --text or --file is required"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = GatewayConfig::from_env().context("Invalid gateway configuration")?;
    let _log_guard = init_logging(&config.logging).context("Failed to initialize logging")?;
    let runtime = build_runtime(config.worker_threads)?;

    runtime.block_on(run(cli.command, config))
}

async fn run(command: Command, config: GatewayConfig) -> anyhow::Result<()> {
    if let Some(address) = config.metrics_listen_address {
        install_prometheus_exporter(address).context("Failed to start metrics exporter")?;
    }

    let service = IntakeService::builder(config).build()?;

    match command {
        Command::Anonymize { input } => {
            let text = input.read()?;
            let response = service.process_text(&text).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Analyze { analysis_type, input, swiss_german, model, max_tokens } => {
            let text = input.read()?;
            let options = AnalysisOptions {
                model,
                max_tokens,
                is_swiss_german: swiss_german,
                ..AnalysisOptions::default()
            };
            let response = service.analyze(&text, analysis_type, options).await?;
            info!(provider = %response.result.provider, "Analysis finished");
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Transcribe { file } => {
            let audio = std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "audio.wav".to_string());
            let response = service.transcribe_and_anonymize(&audio, &file_name).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Providers { probe } => {
            let chain = service.provider_chain();
            let available = if probe { Some(service.available_providers().await) } else { None };
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "chain": chain,
                    "available": available,
                }))?
            );
        }
    }

    Ok(())
}
