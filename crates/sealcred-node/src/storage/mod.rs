mod types;

pub use types::*;

use crate::LedgerKind;
use sealcred_ledger::{CredentialFamily, Ledger};
use sealcred_types::{EthAddress, SealCredError, SealCredResult};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Transactional, Tree};
use std::path::PathBuf;
use tracing::{debug, info};

const CURRENT_SCHEMA_VERSION: u32 = 1;
const SCHEMA_KEY: &[u8] = b"__schema_version__";

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub cache_capacity_bytes: u64,
    pub flush_every_ms: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ledgers"),
            cache_capacity_bytes: 64 * 1024 * 1024,
            flush_every_ms: Some(1000),
        }
    }
}

fn storage_err(context: &str) -> impl Fn(sled::Error) -> SealCredError + '_ {
    move |e| SealCredError::Storage(format!("{}: {}", context, e))
}

/// Ledger snapshots in sled: one tree per credential family keyed by ledger
/// address, plus deployment records and per-deployer CREATE nonces.
pub struct LedgerStore {
    db: Db,
    schema: Tree,
    deployments: Tree,
    nonces: Tree,
    config: StorageConfig,
}

impl LedgerStore {
    pub fn open(config: StorageConfig) -> SealCredResult<Self> {
        info!("Opening ledger storage at {:?}", config.path);

        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity_bytes)
            .flush_every_ms(config.flush_every_ms)
            .open()
            .map_err(storage_err("Failed to open database"))?;

        let store = Self::create_from_db(db, config)?;
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> SealCredResult<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(storage_err("Failed to open temp database"))?;

        let config = StorageConfig {
            path: PathBuf::new(),
            ..Default::default()
        };
        let store = Self::create_from_db(db, config)?;
        store.ensure_schema()?;
        Ok(store)
    }

    fn create_from_db(db: Db, config: StorageConfig) -> SealCredResult<Self> {
        let schema = Self::open_tree(&db, "schema")?;
        let deployments = Self::open_tree(&db, "deployments")?;
        let nonces = Self::open_tree(&db, "nonces")?;
        Ok(Self {
            db,
            schema,
            deployments,
            nonces,
            config,
        })
    }

    fn open_tree(db: &Db, name: &str) -> SealCredResult<Tree> {
        db.open_tree(name)
            .map_err(|e| SealCredError::Storage(format!("Failed to open {} tree: {}", name, e)))
    }

    fn ledger_tree(&self, kind: LedgerKind) -> SealCredResult<Tree> {
        Self::open_tree(&self.db, kind.name())
    }

    fn ensure_schema(&self) -> SealCredResult<()> {
        match self.schema_version()? {
            None => {
                info!("Initializing new database with schema version {}", CURRENT_SCHEMA_VERSION);
                let info = SchemaInfo {
                    version: CURRENT_SCHEMA_VERSION,
                    created_at: chrono::Utc::now().timestamp(),
                };
                let bytes = bincode::serialize(&info)
                    .map_err(|e| SealCredError::Serialization(format!("Failed to serialize schema: {}", e)))?;
                self.schema
                    .insert(SCHEMA_KEY, bytes)
                    .map_err(storage_err("Failed to store schema"))?;
                self.flush()
            }
            Some(version) if version > CURRENT_SCHEMA_VERSION => Err(SealCredError::Storage(format!(
                "Database schema version {} is newer than supported {}",
                version, CURRENT_SCHEMA_VERSION
            ))),
            Some(_) => Ok(()),
        }
    }

    pub fn schema_version(&self) -> SealCredResult<Option<u32>> {
        match self.schema.get(SCHEMA_KEY).map_err(storage_err("Failed to read schema"))? {
            Some(bytes) => {
                let info: SchemaInfo = bincode::deserialize(&bytes)
                    .map_err(|e| SealCredError::Serialization(format!("Failed to deserialize schema: {}", e)))?;
                Ok(Some(info.version))
            }
            None => Ok(None),
        }
    }

    /// CREATE nonce the next ledger deployed by `deployer` will use.
    pub fn deployer_nonce(&self, deployer: &EthAddress) -> SealCredResult<u64> {
        match self
            .nonces
            .get(deployer.as_bytes())
            .map_err(storage_err("Failed to read nonce"))?
        {
            Some(bytes) => {
                let raw: [u8; 8] = bytes
                    .as_ref()
                    .try_into()
                    .map_err(|_| SealCredError::Storage("Corrupt nonce entry".into()))?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }

    pub fn deployment(&self, address: &EthAddress) -> SealCredResult<Option<DeploymentRecord>> {
        match self
            .deployments
            .get(address.as_bytes())
            .map_err(storage_err("Failed to read deployment"))?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes).map_err(|e| {
                SealCredError::Serialization(format!("Failed to deserialize deployment: {}", e))
            })?)),
            None => Ok(None),
        }
    }

    pub fn deployments(&self) -> SealCredResult<Vec<DeploymentRecord>> {
        let mut records = Vec::new();
        for entry in self.deployments.iter() {
            let (_, value) = entry.map_err(storage_err("Failed to iterate deployments"))?;
            records.push(bincode::deserialize(&value).map_err(|e| {
                SealCredError::Serialization(format!("Failed to deserialize deployment: {}", e))
            })?);
        }
        records.sort_by_key(|r: &DeploymentRecord| r.deployed_at);
        Ok(records)
    }

    /// Writes the fresh ledger, its deployment record and the deployer's
    /// bumped nonce in one transaction.
    pub fn insert_deployment<F: CredentialFamily>(
        &self,
        kind: LedgerKind,
        record: &DeploymentRecord,
        ledger: &Ledger<F>,
    ) -> SealCredResult<()> {
        let ledgers = self.ledger_tree(kind)?;
        let snapshot = encode_ledger(ledger)?;
        let record_bytes = bincode::serialize(record)
            .map_err(|e| SealCredError::Serialization(format!("Failed to serialize deployment: {}", e)))?;
        let next_nonce = (record.deployer_nonce + 1).to_be_bytes();
        let key = record.address.as_bytes().to_vec();
        let deployer_key = record.deployer.as_bytes().to_vec();

        (&ledgers, &self.deployments, &self.nonces)
            .transaction(|(ledgers, deployments, nonces)| {
                ledgers.insert(key.as_slice(), snapshot.as_slice())?;
                deployments.insert(key.as_slice(), record_bytes.as_slice())?;
                nonces.insert(deployer_key.as_slice(), &next_nonce[..])?;
                Ok::<_, ConflictableTransactionError<()>>(())
            })
            .map_err(|e: TransactionError<()>| {
                SealCredError::Storage(format!("Deployment transaction failed: {:?}", e))
            })?;

        debug!(ledger = %record.address, kind = %kind, "Deployment stored");
        self.flush()
    }

    pub fn load_ledger<F: CredentialFamily>(
        &self,
        kind: LedgerKind,
        address: &EthAddress,
    ) -> SealCredResult<Option<Ledger<F>>> {
        let tree = self.ledger_tree(kind)?;
        match tree
            .get(address.as_bytes())
            .map_err(storage_err("Failed to read ledger"))?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes).map_err(|e| {
                SealCredError::Serialization(format!("Failed to deserialize ledger: {}", e))
            })?)),
            None => Ok(None),
        }
    }

    pub fn store_ledger<F: CredentialFamily>(
        &self,
        kind: LedgerKind,
        ledger: &Ledger<F>,
    ) -> SealCredResult<()> {
        let tree = self.ledger_tree(kind)?;
        tree.insert(ledger.address().as_bytes(), encode_ledger(ledger)?)
            .map_err(storage_err("Failed to store ledger"))?;
        self.flush()
    }

    pub fn tree_sizes(&self) -> SealCredResult<TreeSizes> {
        let mut ledgers = Vec::new();
        for kind in LedgerKind::ALL {
            ledgers.push((kind.name().to_string(), self.ledger_tree(kind)?.len()));
        }
        Ok(TreeSizes {
            deployments: self.deployments.len(),
            ledgers,
        })
    }

    pub fn flush(&self) -> SealCredResult<()> {
        self.db.flush().map_err(storage_err("Flush error"))?;
        Ok(())
    }

    pub fn size_on_disk(&self) -> SealCredResult<u64> {
        self.db.size_on_disk().map_err(storage_err("Size error"))
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn is_in_memory(&self) -> bool {
        self.config.path.as_os_str().is_empty()
    }
}

fn encode_ledger<F: CredentialFamily>(ledger: &Ledger<F>) -> SealCredResult<Vec<u8>> {
    bincode::serialize(ledger)
        .map_err(|e| SealCredError::Serialization(format!("Failed to serialize ledger: {}", e)))
}
