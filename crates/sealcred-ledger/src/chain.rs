//! What a ledger can observe about the rest of the chain: deployed verifier
//! contracts, ERC-721 collection metadata and SealHub commitment roots.

use sealcred_crypto::ProofVerifier;
use sealcred_types::{EthAddress, FieldElement};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// `name()` / `symbol()` of an ERC-721 collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub name: String,
    pub symbol: String,
}

pub trait ChainView {
    /// The verifier contract deployed at `address`, if any.
    fn verifier(&self, address: &EthAddress) -> Option<&dyn ProofVerifier>;

    fn collection(&self, address: &EthAddress) -> Option<&CollectionMetadata>;

    /// Whether `root` is a commitment root the SealHub at `seal_hub` accepts.
    fn is_seal_hub_root(&self, seal_hub: &EthAddress, root: &FieldElement) -> bool;
}

#[derive(Default)]
pub struct MemoryChain {
    verifiers: HashMap<EthAddress, Arc<dyn ProofVerifier>>,
    collections: HashMap<EthAddress, CollectionMetadata>,
    seal_hub_roots: HashMap<EthAddress, HashSet<FieldElement>>,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_verifier(&mut self, address: EthAddress, verifier: Arc<dyn ProofVerifier>) {
        self.verifiers.insert(address, verifier);
    }

    pub fn add_collection(&mut self, address: EthAddress, name: &str, symbol: &str) {
        self.collections.insert(
            address,
            CollectionMetadata {
                name: name.to_string(),
                symbol: symbol.to_string(),
            },
        );
    }

    pub fn add_seal_hub_root(&mut self, seal_hub: EthAddress, root: FieldElement) {
        self.seal_hub_roots.entry(seal_hub).or_default().insert(root);
    }

    pub fn verifier_addresses(&self) -> impl Iterator<Item = &EthAddress> {
        self.verifiers.keys()
    }
}

impl ChainView for MemoryChain {
    fn verifier(&self, address: &EthAddress) -> Option<&dyn ProofVerifier> {
        self.verifiers.get(address).map(|v| v.as_ref())
    }

    fn collection(&self, address: &EthAddress) -> Option<&CollectionMetadata> {
        self.collections.get(address)
    }

    fn is_seal_hub_root(&self, seal_hub: &EthAddress, root: &FieldElement) -> bool {
        self.seal_hub_roots
            .get(seal_hub)
            .map(|roots| roots.contains(root))
            .unwrap_or(false)
    }
}
