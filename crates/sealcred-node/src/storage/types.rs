use crate::LedgerKind;
use chrono::{DateTime, Utc};
use sealcred_types::EthAddress;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub version: u32,
    pub created_at: i64,
}

/// Where a ledger lives and who deployed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub address: EthAddress,
    pub kind: LedgerKind,
    pub deployer: EthAddress,
    pub deployer_nonce: u64,
    pub deployed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSizes {
    pub deployments: usize,
    pub ledgers: Vec<(String, usize)>,
}

impl std::fmt::Display for DeploymentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} {} (deployer {}, nonce {}, {})",
            self.kind,
            self.address,
            self.deployer,
            self.deployer_nonce,
            self.deployed_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}
