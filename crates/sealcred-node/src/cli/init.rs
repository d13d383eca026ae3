use anyhow::{Context, Result};
use sealcred_node::{LedgerService, NodeConfig};
use std::path::Path;

pub fn init_node(config_path: &Path, data_dir: &Path, force: bool) -> Result<()> {
    println!("\x1b[38;5;46mInitializing SealCred node...\x1b[0m");
    println!();

    if config_path.exists() && !force {
        println!("\x1b[38;5;226mConfiguration already exists at {:?}\x1b[0m", config_path);
        println!("Use --force to overwrite");
        return Ok(());
    }

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let config = NodeConfig {
        data_dir: data_dir.to_path_buf(),
        ..NodeConfig::default()
    };
    config.save(config_path)?;

    let service = LedgerService::from_config(&config)?;
    let schema = service.store().schema_version()?.unwrap_or(0);

    println!("\x1b[38;5;46m[+]\x1b[0m Config:  {:?}", config_path);
    println!("\x1b[38;5;46m[+]\x1b[0m Storage: {:?} (schema v{})", config.storage_path(), schema);
    println!();
    println!("\x1b[38;5;226mNext steps:\x1b[0m");
    println!("  1. Add [[verifiers]] and [[collections]] entries to config.toml");
    println!("  2. Deploy a ledger: \x1b[38;5;51msealcred deploy --family erc721 ...\x1b[0m");
    println!("  3. Mint from a proof: \x1b[38;5;51msealcred mint --ledger <ADDR> --caller <ADDR> --proof proof.json\x1b[0m");

    Ok(())
}
