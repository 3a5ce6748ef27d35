//! Normalizer Command Line Tool
//!
//! Loads a normalizer set and either prints its definitions or normalizes
//! values for one feature under a given set of request parameters.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use ltr_norm::{NormalizerSet, RequestParams};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "ltr-norm", version, about = "Inspect and apply learning-to-rank feature normalizers")]
pub struct Cli {
    /// Normalizer set file (JSON or TOML)
    #[arg(short, long, global = true, default_value = "normalizers.toml")]
    pub config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every configured normalizer's parameters as JSON
    Describe,
    /// Normalize raw values for one feature
    Normalize {
        /// Feature whose normalizer to apply
        #[arg(short, long)]
        feature: String,
        /// Request parameter, `name=value`; repeatable
        #[arg(short, long = "param")]
        params: Vec<String>,
        /// Raw feature values
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f32>,
    },
}

/// Install the global subscriber; `RUST_LOG` overrides the default level.
/// Logs go to stderr so command output stays parseable.
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    if installed.is_err() {
        eprintln!("tracing subscriber already installed");
    }
}

/// Execute a command, returning what should be printed
pub fn run(cli: &Cli) -> Result<String> {
    let set = NormalizerSet::load(&cli.config)
        .with_context(|| format!("loading normalizers from {}", cli.config.display()))?;

    match &cli.command {
        Command::Describe => {
            Ok(serde_json::to_string_pretty(&set.describe()).context("serializing normalizers")?)
        }
        Command::Normalize {
            feature,
            params,
            values,
        } => {
            let definition = set
                .get(feature)
                .ok_or_else(|| anyhow!("no normalizer configured for feature {feature}"))?;

            let mut request = RequestParams::new();
            for pair in params {
                request.insert_pair(pair)?;
            }

            let normalizer = definition
                .prepare(&request)
                .with_context(|| format!("preparing normalizer for {feature}"))?;
            info!(feature = feature.as_str(), normalizer = %normalizer.inner(), "Normalizing {} values", values.len());

            let lines: Vec<String> = normalizer
                .normalize_all(values)
                .iter()
                .map(|value| value.to_string())
                .collect();
            Ok(lines.join("\n"))
        }
    }
}
