mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, DeployRequest};
use sealcred_node::{LedgerService, NodeConfig};
use std::path::PathBuf;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| {
        dirs::home_dir()
            .map(|h| h.join(".sealcred"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/sealcred"))
    });
    let config_path = cli.config.clone().unwrap_or_else(|| data_dir.join("config.toml"));

    if let Commands::Init { force } = cli.command {
        return cli::init_node(&config_path, &data_dir, force);
    }

    let mut config = NodeConfig::load(&config_path)?;
    if cli.data_dir.is_some() {
        config.data_dir = data_dir;
    }

    cli::init_logging(&cli, &config.logging)?;
    debug!(config = ?config_path, "Configuration loaded");

    // Stateless commands don't need storage.
    match cli.command {
        Commands::Ecdsa { action } => return cli::handle_ecdsa(action, &cli.format),
        Commands::Decode { family, ref proof } => return cli::decode(family, proof, &cli.format),
        _ => {}
    }

    let service = LedgerService::from_config(&config)?;
    let format = &cli.format;

    match cli.command {
        Commands::Deploy {
            family,
            owner,
            verifier,
            attestor,
            network,
            ecdsa_attestor,
            seal_hub,
            base_uri,
            ledger_version,
        } => {
            let request = DeployRequest {
                family,
                owner,
                verifier,
                attestor,
                network,
                ecdsa_attestor,
                seal_hub,
                base_uri,
                version: ledger_version,
            };
            cli::deploy(&service, request, format).await?;
        }
        Commands::Mint { call, proof, original, message, signature } => {
            cli::mint(
                &service,
                call,
                &proof,
                original.as_deref(),
                message.as_deref(),
                signature.as_deref(),
                format,
            )
            .await?;
        }
        Commands::Derivative { ledger, target, address, nullifier } => {
            cli::derivative(&service, &ledger, &target, address, nullifier, format).await?;
        }
        Commands::Balance { ledger, original, account } => {
            cli::balance(&service, &ledger, &original, &account, format).await?;
        }
        Commands::TokenUri { ledger, derivative, token_id } => {
            cli::token_uri(&service, &ledger, &derivative, token_id, format).await?;
        }
        Commands::SetVerifier { call, verifier } => {
            cli::set_verifier(&service, call, verifier).await?;
        }
        Commands::SetBaseUri { call, base_uri, derivative } => {
            cli::set_base_uri(&service, call, &base_uri, derivative).await?;
        }
        Commands::DeleteOriginal { call, original } => {
            cli::delete_original(&service, call, &original).await?;
        }
        Commands::TransferOwnership { call, new_owner } => {
            cli::transfer_ownership(&service, call, new_owner).await?;
        }
        Commands::Info { ledger } => {
            cli::show_info(&service, &config, ledger, format).await?;
        }
        Commands::Init { .. } | Commands::Ecdsa { .. } | Commands::Decode { .. } => {}
    }

    service.store().flush()?;
    Ok(())
}
