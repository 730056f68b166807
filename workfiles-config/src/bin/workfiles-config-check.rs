use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workfiles_config::{WorkfilesConfig, WorkfilesConfigSource, validate_config};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Toml,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "workfiles-config-check",
    about = "Load, validate and print the effective workfiles configuration"
)]
struct Cli {
    /// Config file to load instead of the environment lookup.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "toml")]
    format: OutputFormat,
    /// Only validate; print nothing on success.
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let (config, source) = match &cli.config {
        Some(path) => (
            WorkfilesConfig::load_from_file(path)?,
            WorkfilesConfigSource::File(path.clone()),
        ),
        None => WorkfilesConfig::load_from_env()?,
    };
    info!(?source, "configuration loaded");

    let warnings =
        validate_config(&config).context("configuration is invalid")?;
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => warn!(hint = %hint, "{}", warning.message),
            None => warn!("{}", warning.message),
        }
    }

    if !cli.quiet {
        let rendered = match cli.format {
            OutputFormat::Toml => config.to_toml()?,
            OutputFormat::Json => serde_json::to_string_pretty(&config)
                .context("failed to render workfiles config")?,
        };
        println!("{rendered}");
    }
    Ok(())
}
