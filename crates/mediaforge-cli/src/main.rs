//! MediaForge CLI — inspect uploaded files and run convert/compress actions.
//!
//! Configuration comes from MEDIAFORGE_* environment variables (a .env file
//! is honored). The web layer normally drives the same core; this binary is
//! the standalone entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use mediaforge_core::Config;
use mediaforge_processing::{CompressorRegistry, ConverterRegistry, Dispatcher, SummaryBuilder};

#[derive(Parser)]
#[command(name = "mediaforge")]
#[command(about = "Convert and compress media and document files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a file summary with the operations available for it
    Inspect {
        /// File to inspect
        file: PathBuf,
    },
    /// Run an action on one or more files
    Process {
        /// Action identifier, e.g. convert, compress_mp4_28,
        /// compress_pdf_high, split_pdf, merge_pdf
        action: String,
        /// Input file(s); merge_pdf takes two or more
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Arc::new(Config::from_env().context("failed to load configuration")?);
    config.validate()?;

    for dir in [
        &config.upload_dir,
        &config.convert_output_dir,
        &config.compress_output_dir,
    ] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }

    let converters = Arc::new(ConverterRegistry::with_defaults(&config));
    let compressors = Arc::new(CompressorRegistry::with_defaults(&config));

    match cli.command {
        Commands::Inspect { file } => {
            let builder = SummaryBuilder::new(converters, compressors);
            let summary = builder.summarize(&file).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Process { action, files } => {
            let dispatcher = Dispatcher::new(converters, compressors, config);
            let result = dispatcher.dispatch(&files, &action).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_success() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
