use super::commands::OutputFormat;
use super::utils::print_output;
use anyhow::Result;
use sealcred_node::config::ConfigSummary;
use sealcred_node::storage::TreeSizes;
use sealcred_node::{DeploymentRecord, LedgerService, NodeConfig};
use sealcred_types::EthAddress;
use serde::Serialize;
use std::fmt;

#[derive(Serialize)]
struct NodeReport {
    config: ConfigSummary,
    schema_version: Option<u32>,
    size_on_disk: u64,
    trees: TreeSizes,
    deployments: Vec<DeploymentRecord>,
}

impl fmt::Display for NodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.config)?;
        writeln!(f)?;
        match self.schema_version {
            Some(version) => writeln!(f, "Schema: v{}", version)?,
            None => writeln!(f, "Schema: uninitialized")?,
        }
        writeln!(f, "Size on disk: {} bytes", self.size_on_disk)?;
        for (tree, count) in &self.trees.ledgers {
            writeln!(f, "  {}: {} ledgers", tree, count)?;
        }
        writeln!(f)?;
        writeln!(f, "Deployments ({}):", self.deployments.len())?;
        for record in &self.deployments {
            write!(f, "  {}", record)?;
        }
        Ok(())
    }
}

pub async fn show_info(
    service: &LedgerService,
    config: &NodeConfig,
    ledger: Option<EthAddress>,
    format: &OutputFormat,
) -> Result<()> {
    if let Some(ledger) = ledger {
        return print_output(format, &service.ledger_info(&ledger).await?);
    }

    let store = service.store();
    let report = NodeReport {
        config: config.summary(),
        schema_version: store.schema_version()?,
        size_on_disk: store.size_on_disk()?,
        trees: store.tree_sizes()?,
        deployments: service.deployments().await?,
    };
    print_output(format, &report)
}
