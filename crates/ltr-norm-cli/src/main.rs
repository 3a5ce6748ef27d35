//! Normalizer CLI - Main Entry Point

use clap::Parser;
use ltr_norm_cli::{init_logging, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);
    println!("{}", run(&cli)?);
    Ok(())
}
