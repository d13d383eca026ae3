use sealcred_crypto::{FixedVerifier, Groth16Verifier};
use sealcred_ledger::MemoryChain;
use sealcred_types::{SealCredError, SealCredResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::logging::LoggingConfig;
use super::types::{CollectionEntry, LogLevel, SealHubRootEntry, VerifierEntry, VerifierKind};

const DEFAULT_CACHE_CAPACITY: u64 = 64 * 1024 * 1024;
const DEFAULT_FLUSH_MS: u64 = 1000;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Defaults to `<data_dir>/ledgers`.
    pub path: Option<PathBuf>,
    pub cache_capacity_bytes: u64,
    pub flush_every_ms: Option<u64>,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            path: None,
            cache_capacity_bytes: DEFAULT_CACHE_CAPACITY,
            flush_every_ms: Some(DEFAULT_FLUSH_MS),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub data_dir: PathBuf,
    pub logging: LoggingConfig,
    pub storage: StorageSection,
    pub verifiers: Vec<VerifierEntry>,
    pub collections: Vec<CollectionEntry>,
    pub seal_hub_roots: Vec<SealHubRootEntry>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/var/lib/sealcred"));
        Self {
            data_dir: home.join(".sealcred"),
            logging: LoggingConfig::default(),
            storage: StorageSection::default(),
            verifiers: Vec::new(),
            collections: Vec::new(),
            seal_hub_roots: Vec::new(),
        }
    }
}

impl NodeConfig {
    pub fn load(path: impl AsRef<Path>) -> SealCredResult<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| SealCredError::Config(format!("Failed to read config: {}", e)))?;

            toml::from_str(&contents)
                .map_err(|e| SealCredError::Config(format!("Failed to parse config: {}", e)))?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SealCredResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| SealCredError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SealCredError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path.as_ref(), contents)
            .map_err(|e| SealCredError::Config(format!("Failed to write config: {}", e)))?;

        info!("Configuration saved to {:?}", path.as_ref());
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("SEALCRED_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }

        self.logging.apply_env_overrides();
    }

    pub fn validate(&self) -> SealCredResult<()> {
        let mut seen = HashSet::new();
        for verifier in &self.verifiers {
            if !seen.insert(verifier.address) {
                return Err(SealCredError::Config(format!(
                    "Duplicate verifier address: {}",
                    verifier.address
                )));
            }
            match verifier.kind {
                VerifierKind::Groth16 if verifier.vk_path.is_none() => {
                    return Err(SealCredError::Config(format!(
                        "Groth16 verifier {} has no vk_path",
                        verifier.address
                    )));
                }
                VerifierKind::Fixed if verifier.result.is_none() => {
                    return Err(SealCredError::Config(format!(
                        "Fixed verifier {} has no result",
                        verifier.address
                    )));
                }
                VerifierKind::Fixed if verifier.result == Some(true) => {
                    warn!(
                        verifier = %verifier.address,
                        "Fixed verifier accepts every proof; use only on dev networks"
                    );
                }
                _ => {}
            }
        }

        for collection in &self.collections {
            if collection.name.is_empty() || collection.symbol.is_empty() {
                return Err(SealCredError::Config(format!(
                    "Collection {} needs a name and a symbol",
                    collection.address
                )));
            }
        }

        if self.storage.cache_capacity_bytes == 0 {
            return Err(SealCredError::Config("Storage cache capacity cannot be 0".into()));
        }

        Ok(())
    }

    pub fn storage_path(&self) -> PathBuf {
        self.resolve(self.storage.path.as_deref().unwrap_or_else(|| Path::new("ledgers")))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    /// Assembles the on-chain environment the ledgers run against: verifier
    /// contracts, collection metadata and SealHub roots.
    pub fn build_chain(&self) -> SealCredResult<MemoryChain> {
        let mut chain = MemoryChain::new();

        for entry in &self.verifiers {
            match entry.kind {
                VerifierKind::Groth16 => {
                    let path = entry.vk_path.as_deref().ok_or_else(|| {
                        SealCredError::Config(format!("Groth16 verifier {} has no vk_path", entry.address))
                    })?;
                    let verifier = Groth16Verifier::from_file(&self.resolve(path))?;
                    chain.add_verifier(entry.address, Arc::new(verifier));
                }
                VerifierKind::Fixed => {
                    let result = entry.result.unwrap_or(false);
                    chain.add_verifier(entry.address, Arc::new(FixedVerifier::new(result)));
                }
            }
            debug!(verifier = %entry.address, kind = %entry.kind, "Verifier registered");
        }

        for collection in &self.collections {
            chain.add_collection(collection.address, &collection.name, &collection.symbol);
        }

        for root in &self.seal_hub_roots {
            chain.add_seal_hub_root(root.seal_hub, root.root);
        }

        Ok(chain)
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            data_dir: self.data_dir.clone(),
            storage_path: self.storage_path(),
            log_level: self.logging.level,
            verifiers: self
                .verifiers
                .iter()
                .map(|v| (v.address.to_checksum(), v.kind))
                .collect(),
            collection_count: self.collections.len(),
            seal_hub_root_count: self.seal_hub_roots.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigSummary {
    pub data_dir: PathBuf,
    pub storage_path: PathBuf,
    pub log_level: LogLevel,
    pub verifiers: Vec<(String, VerifierKind)>,
    pub collection_count: usize,
    pub seal_hub_root_count: usize,
}

impl std::fmt::Display for ConfigSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SealCred Node Configuration")?;
        writeln!(f, "===========================")?;
        writeln!(f, "Data dir: {:?}", self.data_dir)?;
        writeln!(f, "Storage: {:?}", self.storage_path)?;
        writeln!(f, "Log level: {}", self.log_level)?;
        writeln!(f, "Verifiers:")?;
        for (address, kind) in &self.verifiers {
            writeln!(f, "  {} ({})", address, kind)?;
        }
        writeln!(f, "Collections: {}", self.collection_count)?;
        writeln!(f, "SealHub roots: {}", self.seal_hub_root_count)?;
        Ok(())
    }
}
