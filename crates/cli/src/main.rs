//! eoproto - EO protocol codec tool

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use eoproto_config::CodecConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CodecConfig::load_from_file(path)
            .map_err(|e| anyhow::anyhow!("failed to load {}: {}", path.display(), e))?,
        None => CodecConfig::load_default()
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?,
    };

    let directive = log_directive(
        cli.verbose,
        std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        &config.log_level,
    );
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .init();

    config.display();

    for line in commands::run(&cli.command, &config)? {
        println!("{}", line);
    }
    Ok(())
}

/// `--verbose` forces debug, then RUST_LOG, then the configured level
fn log_directive(verbose: bool, env: Option<&str>, configured: &str) -> String {
    if verbose {
        return "debug".into();
    }
    match env {
        Some(directive) if !directive.trim().is_empty() => directive.into(),
        _ => configured.into(),
    }
}
