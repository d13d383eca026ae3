use crate::config::NodeConfig;
use crate::storage::{DeploymentRecord, LedgerStore, StorageConfig};
use crate::{with_family, LedgerKind};
use sealcred_crypto::create_address;
use sealcred_ledger::{
    CredentialFamily, EcdsaAttestation, Ledger, LedgerEvent, LedgerParams, MemoryChain, MintReceipt,
    PublicSignals,
};
use sealcred_types::{EthAddress, FieldElement, Network, SealCredError, SealCredResult, ZkProof};
use serde::Serialize;
use std::fmt;
use tokio::sync::RwLock;
use tracing::info;

/// Applies ledger calls against persisted snapshots.
///
/// Calls are serialized: each one loads the ledger, runs, and writes the
/// snapshot back only if the call succeeded.
pub struct LedgerService {
    store: LedgerStore,
    chain: MemoryChain,
    tx_lock: RwLock<()>,
}

impl LedgerService {
    pub fn new(store: LedgerStore, chain: MemoryChain) -> Self {
        Self {
            store,
            chain,
            tx_lock: RwLock::new(()),
        }
    }

    pub fn from_config(config: &NodeConfig) -> SealCredResult<Self> {
        let store = LedgerStore::open(StorageConfig {
            path: config.storage_path(),
            cache_capacity_bytes: config.storage.cache_capacity_bytes,
            flush_every_ms: config.storage.flush_every_ms,
        })?;
        Ok(Self::new(store, config.build_chain()?))
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn chain(&self) -> &MemoryChain {
        &self.chain
    }

    fn record(&self, ledger: &EthAddress) -> SealCredResult<DeploymentRecord> {
        self.store
            .deployment(ledger)?
            .ok_or_else(|| SealCredError::InvalidAddress(format!("no ledger deployed at {}", ledger)))
    }

    fn load<F: CredentialFamily>(&self, record: &DeploymentRecord) -> SealCredResult<Ledger<F>> {
        self.store
            .load_ledger::<F>(record.kind, &record.address)?
            .ok_or_else(|| {
                SealCredError::Storage(format!("ledger {} has a record but no snapshot", record.address))
            })
    }

    /// Deploys a ledger at the CREATE address of `(deployer, nonce)`, owned by
    /// the deployer.
    pub async fn deploy(
        &self,
        kind: LedgerKind,
        deployer: EthAddress,
        params: LedgerParams,
    ) -> SealCredResult<DeploymentRecord> {
        let _guard = self.tx_lock.write().await;

        let nonce = self.store.deployer_nonce(&deployer)?;
        let address = create_address(&deployer, nonce);
        let record = DeploymentRecord {
            address,
            kind,
            deployer,
            deployer_nonce: nonce,
            deployed_at: chrono::Utc::now(),
        };

        with_family!(kind, F => {
            let ledger = Ledger::<F>::new(address, deployer, params)?;
            self.store.insert_deployment(kind, &record, &ledger)?;
        });

        info!(kind = %kind, ledger = %address, deployer = %deployer, "Ledger deployment stored");
        Ok(record)
    }

    pub async fn deployments(&self) -> SealCredResult<Vec<DeploymentRecord>> {
        let _guard = self.tx_lock.read().await;
        self.store.deployments()
    }

    /// Mints against `ledger`. Without `original` the identity named by the
    /// proof is used.
    pub async fn mint(
        &self,
        ledger: &EthAddress,
        caller: EthAddress,
        original: Option<&str>,
        proof: &ZkProof,
        attestation: Option<&EcdsaAttestation>,
    ) -> SealCredResult<MintReceipt> {
        let _guard = self.tx_lock.write().await;
        let record = self.record(ledger)?;

        with_family!(record.kind, F => {
            let mut state = self.load::<F>(&record)?;
            let receipt = match (original, attestation) {
                (Some(text), Some(attestation)) => {
                    let original = F::parse_identity(text)?;
                    state.mint_with_attestation(caller, &original, proof, attestation, &self.chain)?
                }
                (Some(text), None) => {
                    let original = F::parse_identity(text)?;
                    state.mint(caller, &original, proof, &self.chain)?
                }
                (None, attestation) => state.mint_proof(caller, proof, attestation, &self.chain)?,
            };
            self.store.store_ledger(record.kind, &state)?;
            Ok(receipt)
        })
    }

    pub async fn get_derivative(&self, ledger: &EthAddress, original: &str) -> SealCredResult<Option<EthAddress>> {
        let _guard = self.tx_lock.read().await;
        let record = self.record(ledger)?;
        with_family!(record.kind, F => {
            let state = self.load::<F>(&record)?;
            Ok(state.get_derivative(&F::parse_identity(original)?))
        })
    }

    pub async fn balance_of(
        &self,
        ledger: &EthAddress,
        original: &str,
        account: &EthAddress,
    ) -> SealCredResult<u64> {
        let _guard = self.tx_lock.read().await;
        let record = self.record(ledger)?;
        with_family!(record.kind, F => {
            let state = self.load::<F>(&record)?;
            Ok(state.balance_of(&F::parse_identity(original)?, account))
        })
    }

    pub async fn token_uri(
        &self,
        ledger: &EthAddress,
        derivative: &EthAddress,
        token_id: u64,
    ) -> SealCredResult<String> {
        let _guard = self.tx_lock.read().await;
        let record = self.record(ledger)?;
        with_family!(record.kind, F => {
            let state = self.load::<F>(&record)?;
            state.derivative(derivative)?.token_uri(token_id)
        })
    }

    pub async fn is_nullifier_used(
        &self,
        ledger: &EthAddress,
        derivative: &EthAddress,
        nullifier: &FieldElement,
    ) -> SealCredResult<bool> {
        let _guard = self.tx_lock.read().await;
        let record = self.record(ledger)?;
        with_family!(record.kind, F => {
            let state = self.load::<F>(&record)?;
            Ok(state.derivative(derivative)?.is_nullifier_used(nullifier))
        })
    }

    pub async fn derivative_info(
        &self,
        ledger: &EthAddress,
        derivative: &EthAddress,
    ) -> SealCredResult<DerivativeSummary> {
        let _guard = self.tx_lock.read().await;
        let record = self.record(ledger)?;
        with_family!(record.kind, F => {
            let state = self.load::<F>(&record)?;
            let d = state.derivative(derivative)?;
            Ok(DerivativeSummary {
                address: d.address(),
                original: d.original().to_string(),
                registered: state.get_derivative(d.original()) == Some(d.address()),
                name: d.name().to_string(),
                symbol: d.symbol().to_string(),
                owner: d.owner(),
                verifier_contract: d.verifier_contract(),
                network: d.network(),
                base_uri: d.base_uri().to_string(),
                version: d.version().to_string(),
                total_supply: d.total_supply(),
                nullifiers_used: d.nullifiers().len(),
            })
        })
    }

    pub async fn ledger_info(&self, ledger: &EthAddress) -> SealCredResult<LedgerSummary> {
        let _guard = self.tx_lock.read().await;
        let record = self.record(ledger)?;
        with_family!(record.kind, F => {
            let state = self.load::<F>(&record)?;
            Ok(LedgerSummary {
                address: state.address(),
                kind: record.kind,
                owner: state.owner(),
                verifier_contract: state.verifier_contract(),
                attestor_public_key: state.attestor_public_key(),
                network: state.network(),
                attestor_ecdsa_address: state.attestor_ecdsa_address(),
                seal_hub: state.seal_hub(),
                base_uri: state.base_uri().to_string(),
                version: state.version().to_string(),
                nonce: state.nonce(),
                derivatives: state
                    .derivatives()
                    .map(|(original, address)| (original.to_string(), *address))
                    .collect(),
                deployed: state.deployed().count(),
                events: state.events().to_vec(),
            })
        })
    }

    pub async fn set_verifier_contract(
        &self,
        ledger: &EthAddress,
        caller: &EthAddress,
        verifier: EthAddress,
    ) -> SealCredResult<()> {
        let _guard = self.tx_lock.write().await;
        let record = self.record(ledger)?;
        with_family!(record.kind, F => {
            let mut state = self.load::<F>(&record)?;
            state.set_verifier_contract(caller, verifier)?;
            self.store.store_ledger(record.kind, &state)
        })
    }

    /// Sets the ledger's base URI, or overrides one derivative's when
    /// `derivative` is given.
    pub async fn set_base_uri(
        &self,
        ledger: &EthAddress,
        caller: &EthAddress,
        base_uri: &str,
        derivative: Option<&EthAddress>,
    ) -> SealCredResult<()> {
        let _guard = self.tx_lock.write().await;
        let record = self.record(ledger)?;
        with_family!(record.kind, F => {
            let mut state = self.load::<F>(&record)?;
            match derivative {
                Some(derivative) => state.set_derivative_base_uri(caller, derivative, base_uri)?,
                None => state.set_base_uri(caller, base_uri)?,
            }
            self.store.store_ledger(record.kind, &state)
        })
    }

    pub async fn delete_original(
        &self,
        ledger: &EthAddress,
        caller: &EthAddress,
        original: &str,
    ) -> SealCredResult<()> {
        let _guard = self.tx_lock.write().await;
        let record = self.record(ledger)?;
        with_family!(record.kind, F => {
            let mut state = self.load::<F>(&record)?;
            state.delete_original(caller, &F::parse_identity(original)?)?;
            self.store.store_ledger(record.kind, &state)
        })
    }

    pub async fn transfer_ownership(
        &self,
        ledger: &EthAddress,
        caller: &EthAddress,
        new_owner: EthAddress,
    ) -> SealCredResult<()> {
        let _guard = self.tx_lock.write().await;
        let record = self.record(ledger)?;
        with_family!(record.kind, F => {
            let mut state = self.load::<F>(&record)?;
            state.transfer_ownership(caller, new_owner)?;
            self.store.store_ledger(record.kind, &state)
        })
    }
}

/// Decodes a public-input vector under `kind`'s layout without checking it
/// against any ledger.
pub fn decode_signals(kind: LedgerKind, input: &[FieldElement]) -> SealCredResult<PublicSignals<String>> {
    with_family!(kind, F => {
        let signals = F::decode(input)?;
        Ok(PublicSignals {
            attestation_type: signals.attestation_type,
            source: signals.source,
            identity: signals.identity.to_string(),
            network: signals.network,
            token_id: signals.token_id,
            threshold: signals.threshold,
            seal_hub_commitment: signals.seal_hub_commitment,
            nullifier: signals.nullifier,
            attestor: signals.attestor,
        })
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub address: EthAddress,
    pub kind: LedgerKind,
    pub owner: EthAddress,
    pub verifier_contract: EthAddress,
    pub attestor_public_key: FieldElement,
    pub network: Option<Network>,
    pub attestor_ecdsa_address: Option<EthAddress>,
    pub seal_hub: Option<EthAddress>,
    pub base_uri: String,
    pub version: String,
    pub nonce: u64,
    pub derivatives: Vec<(String, EthAddress)>,
    pub deployed: usize,
    pub events: Vec<LedgerEvent>,
}

impl fmt::Display for LedgerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ledger {} ({})", self.address, self.kind)?;
        writeln!(f, "  Owner: {}", self.owner)?;
        writeln!(f, "  Verifier: {}", self.verifier_contract)?;
        writeln!(f, "  Attestor: {}", self.attestor_public_key)?;
        if let Some(network) = self.network {
            writeln!(f, "  Network: {}", network)?;
        }
        if let Some(ecdsa) = self.attestor_ecdsa_address {
            writeln!(f, "  ECDSA attestor: {}", ecdsa)?;
        }
        if let Some(seal_hub) = self.seal_hub {
            writeln!(f, "  SealHub: {}", seal_hub)?;
        }
        writeln!(f, "  Base URI: {}", self.base_uri)?;
        writeln!(f, "  Version: {}", self.version)?;
        writeln!(f, "  Next nonce: {}", self.nonce)?;
        writeln!(f, "  Derivatives ({} deployed):", self.deployed)?;
        for (original, address) in &self.derivatives {
            writeln!(f, "    {} -> {}", original, address)?;
        }
        writeln!(f, "  Events: {}", self.events.len())?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DerivativeSummary {
    pub address: EthAddress,
    pub original: String,
    /// Whether the ledger still maps `original` to this derivative.
    pub registered: bool,
    pub name: String,
    pub symbol: String,
    pub owner: EthAddress,
    pub verifier_contract: EthAddress,
    pub network: Option<Network>,
    pub base_uri: String,
    pub version: String,
    pub total_supply: u64,
    pub nullifiers_used: usize,
}

impl fmt::Display for DerivativeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Derivative {}", self.address)?;
        writeln!(f, "  Original: {}{}", self.original, if self.registered { "" } else { " (deleted)" })?;
        writeln!(f, "  Name: {}", self.name)?;
        writeln!(f, "  Symbol: {}", self.symbol)?;
        writeln!(f, "  Owner: {}", self.owner)?;
        writeln!(f, "  Verifier: {}", self.verifier_contract)?;
        writeln!(f, "  Base URI: {}", self.base_uri)?;
        writeln!(f, "  Version: {}", self.version)?;
        writeln!(f, "  Total supply: {}", self.total_supply)?;
        writeln!(f, "  Nullifiers used: {}", self.nullifiers_used)?;
        Ok(())
    }
}
