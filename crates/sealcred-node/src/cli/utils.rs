use super::commands::{Cli, OutputFormat};
use anyhow::{Context, Result};
use sealcred_ledger::EcdsaAttestation;
use sealcred_node::config::LoggingConfig;
use sealcred_types::ZkProof;
use serde::Serialize;
use std::fmt::Display;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logs go to stderr (or the log file) so that stdout stays parseable.
pub fn init_logging(cli: &Cli, logging: &LoggingConfig) -> Result<()> {
    let level = logging.directive(cli.quiet, cli.verbose);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    match logging.destination(cli.log_file.as_deref()) {
        Some(log_file) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .with_context(|| format!("Failed to open log file {:?}", log_file))?;
            let file_layer = fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false);
            if logging.json {
                subscriber.with(file_layer.json()).init();
            } else {
                subscriber.with(file_layer).init();
            }
        }
        None if logging.json => {
            subscriber
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        None => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(cli.verbose >= 2)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
    Ok(())
}

pub fn print_output<T: Serialize + Display>(format: &OutputFormat, value: &T) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", value),
    }
    Ok(())
}

pub fn print_line<T: Serialize + Display>(format: &OutputFormat, value: &T) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Text => println!("{}", value),
    }
    Ok(())
}

pub fn read_proof(path: &Path) -> Result<ZkProof> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read proof file {:?}", path))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse proof file {:?}", path))
}

pub fn parse_hex_bytes(text: &str) -> Result<Vec<u8>> {
    let stripped = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(stripped).with_context(|| format!("Invalid hex: {}", text))
}

pub fn parse_attestation(message: Option<&str>, signature: Option<&str>) -> Result<Option<EcdsaAttestation>> {
    match (message, signature) {
        (Some(message), Some(signature)) => Ok(Some(EcdsaAttestation::from_slices(
            &parse_hex_bytes(message)?,
            &parse_hex_bytes(signature)?,
        )?)),
        _ => Ok(None),
    }
}
