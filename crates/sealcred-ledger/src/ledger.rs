use crate::attestation::EcdsaAttestation;
use crate::chain::ChainView;
use crate::derivative::{Derivative, DerivativeParams, MintTerms};
use crate::events::{LedgerEvent, MintReceipt};
use crate::family::CredentialFamily;
use crate::nullifier::NullifierSet;
use sealcred_crypto::create_address;
use sealcred_types::{EthAddress, FieldElement, Network, SealCredError, SealCredResult, ZkProof};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tracing::{info, warn};

/// Deployment arguments of a ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    pub verifier_contract: EthAddress,
    pub attestor_public_key: FieldElement,
    pub network: Option<Network>,
    pub attestor_ecdsa_address: Option<EthAddress>,
    pub seal_hub: Option<EthAddress>,
    pub base_uri: String,
    pub version: String,
}

/// Registry of one derivative per origin identity, plus the administration
/// shared by all of them.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Ledger<F: CredentialFamily> {
    address: EthAddress,
    owner: EthAddress,
    verifier_contract: EthAddress,
    attestor_public_key: FieldElement,
    network: Option<Network>,
    attestor_ecdsa_address: Option<EthAddress>,
    seal_hub: Option<EthAddress>,
    base_uri: String,
    version: String,
    /// CREATE nonce for the next derivative.
    nonce: u64,
    originals: BTreeMap<F::Identity, EthAddress>,
    /// Every derivative this ledger deployed, registered or not.
    deployed: BTreeMap<EthAddress, Derivative<F>>,
    events: Vec<LedgerEvent>,
    #[serde(skip)]
    _family: PhantomData<F>,
}

impl<F: CredentialFamily> Ledger<F> {
    pub fn new(address: EthAddress, owner: EthAddress, params: LedgerParams) -> SealCredResult<Self> {
        if F::HAS_NETWORK && params.network.is_none() {
            return Err(SealCredError::Config(format!(
                "{} ledger requires a network",
                F::NAME
            )));
        }
        if F::REQUIRES_ECDSA && params.attestor_ecdsa_address.is_none() {
            return Err(SealCredError::Config(format!(
                "{} ledger requires an ECDSA attestor address",
                F::NAME
            )));
        }

        info!(
            family = F::NAME,
            ledger = %address,
            owner = %owner,
            version = %params.version,
            "Ledger deployed"
        );

        Ok(Self {
            address,
            owner,
            verifier_contract: params.verifier_contract,
            attestor_public_key: params.attestor_public_key,
            network: params.network,
            attestor_ecdsa_address: params.attestor_ecdsa_address,
            seal_hub: params.seal_hub,
            base_uri: params.base_uri,
            version: params.version,
            // Contract accounts start at nonce 1.
            nonce: 1,
            originals: BTreeMap::new(),
            deployed: BTreeMap::new(),
            events: Vec::new(),
            _family: PhantomData,
        })
    }

    pub fn address(&self) -> EthAddress {
        self.address
    }

    pub fn owner(&self) -> EthAddress {
        self.owner
    }

    pub fn verifier_contract(&self) -> EthAddress {
        self.verifier_contract
    }

    pub fn attestor_public_key(&self) -> FieldElement {
        self.attestor_public_key
    }

    pub fn network(&self) -> Option<Network> {
        self.network
    }

    pub fn attestor_ecdsa_address(&self) -> Option<EthAddress> {
        self.attestor_ecdsa_address
    }

    pub fn seal_hub(&self) -> Option<EthAddress> {
        self.seal_hub
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Derivative currently registered for `original`.
    pub fn get_derivative(&self, original: &F::Identity) -> Option<EthAddress> {
        self.originals.get(original).copied()
    }

    /// Registered `(original, derivative)` pairs.
    pub fn derivatives(&self) -> impl Iterator<Item = (&F::Identity, &EthAddress)> {
        self.originals.iter()
    }

    /// A deployed derivative by address, including unregistered ones.
    pub fn derivative(&self, address: &EthAddress) -> SealCredResult<&Derivative<F>> {
        self.deployed
            .get(address)
            .ok_or_else(|| SealCredError::UnknownDerivative(address.to_hex()))
    }

    pub fn derivative_mut(&mut self, address: &EthAddress) -> SealCredResult<&mut Derivative<F>> {
        self.deployed
            .get_mut(address)
            .ok_or_else(|| SealCredError::UnknownDerivative(address.to_hex()))
    }

    pub fn deployed(&self) -> impl Iterator<Item = &Derivative<F>> {
        self.deployed.values()
    }

    pub fn balance_of(&self, original: &F::Identity, account: &EthAddress) -> u64 {
        self.get_derivative(original)
            .and_then(|address| self.deployed.get(&address))
            .map(|derivative| derivative.balance_of(account))
            .unwrap_or(0)
    }

    pub fn mint(
        &mut self,
        caller: EthAddress,
        original: &F::Identity,
        proof: &ZkProof,
        chain: &dyn ChainView,
    ) -> SealCredResult<MintReceipt> {
        self.mint_with(caller, original, proof, None, chain)
    }

    pub fn mint_with_attestation(
        &mut self,
        caller: EthAddress,
        original: &F::Identity,
        proof: &ZkProof,
        attestation: &EcdsaAttestation,
        chain: &dyn ChainView,
    ) -> SealCredResult<MintReceipt> {
        self.mint_with(caller, original, proof, Some(attestation), chain)
    }

    /// Mints for whatever origin the proof itself names.
    pub fn mint_proof(
        &mut self,
        caller: EthAddress,
        proof: &ZkProof,
        attestation: Option<&EcdsaAttestation>,
        chain: &dyn ChainView,
    ) -> SealCredResult<MintReceipt> {
        let original = F::decode(&proof.input)?.identity;
        self.mint_with(caller, &original, proof, attestation, chain)
    }

    fn mint_with(
        &mut self,
        caller: EthAddress,
        original: &F::Identity,
        proof: &ZkProof,
        attestation: Option<&EcdsaAttestation>,
        chain: &dyn ChainView,
    ) -> SealCredResult<MintReceipt> {
        if F::REQUIRES_ECDSA && attestation.is_none() {
            warn!(family = F::NAME, ledger = %self.address, "Mint without ECDSA attestation");
            return Err(SealCredError::EcdsaAttestationRequired);
        }

        if let Some(address) = self.get_derivative(original) {
            let derivative = self.derivative_mut(&address)?;
            let receipt = derivative.mint_with(caller, proof, attestation, chain)?;
            self.record(LedgerEvent::Mint {
                derivative: address,
                to: caller,
                token_id: receipt.token_id,
            });
            return Ok(receipt);
        }

        // Every proof check runs before origin metadata is resolved.
        let address = create_address(&self.address, self.nonce);
        let fresh = NullifierSet::new();
        let terms = MintTerms::<F> {
            derivative: address,
            original,
            verifier_contract: self.verifier_contract,
            attestor_public_key: self.attestor_public_key,
            network: self.network,
            attestor_ecdsa_address: self.attestor_ecdsa_address,
            seal_hub: self.seal_hub,
            nullifiers: &fresh,
        };
        let nullifier = match terms.check(proof, attestation, chain) {
            Ok(nullifier) => nullifier,
            Err(e) => {
                warn!(
                    family = F::NAME,
                    ledger = %self.address,
                    original = %original,
                    "Mint rejected: {}",
                    e
                );
                return Err(e);
            }
        };

        // The derivative only joins the registry once its first mint succeeds.
        let mut derivative = self.build_derivative(address, original, attestation, chain)?;
        let mut receipt = derivative.record_mint(caller, nullifier);
        receipt.created = true;

        self.nonce += 1;
        self.originals.insert(original.clone(), address);
        self.deployed.insert(address, derivative);

        info!(
            family = F::NAME,
            ledger = %self.address,
            original = %original,
            derivative = %address,
            "Derivative created"
        );
        self.record(LedgerEvent::CreateDerivative {
            original: original.to_string(),
            derivative: address,
        });
        self.record(LedgerEvent::Mint {
            derivative: address,
            to: caller,
            token_id: receipt.token_id,
        });
        Ok(receipt)
    }

    fn build_derivative(
        &self,
        address: EthAddress,
        original: &F::Identity,
        attestation: Option<&EcdsaAttestation>,
        chain: &dyn ChainView,
    ) -> SealCredResult<Derivative<F>> {
        let metadata = F::origin_metadata(original, chain, attestation)?;
        Derivative::new(DerivativeParams {
            address,
            owner: self.address,
            ledger: self.address,
            original: original.clone(),
            verifier_contract: self.verifier_contract,
            attestor_public_key: self.attestor_public_key,
            network: self.network,
            attestor_ecdsa_address: self.attestor_ecdsa_address,
            seal_hub: self.seal_hub,
            name: metadata.name,
            symbol: metadata.symbol,
            base_uri: self.base_uri.clone(),
            version: self.version.clone(),
        })
    }

    fn record(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    fn only_owner(&self, caller: &EthAddress) -> SealCredResult<()> {
        if *caller != self.owner {
            warn!(ledger = %self.address, caller = %caller, "Owner-only call rejected");
            return Err(SealCredError::NotOwner);
        }
        Ok(())
    }

    /// Affects derivatives deployed from now on; existing ones keep the
    /// verifier they were built with.
    pub fn set_verifier_contract(
        &mut self,
        caller: &EthAddress,
        verifier_contract: EthAddress,
    ) -> SealCredResult<()> {
        self.only_owner(caller)?;
        self.verifier_contract = verifier_contract;
        info!(ledger = %self.address, verifier = %verifier_contract, "Verifier contract updated");
        Ok(())
    }

    pub fn set_base_uri(&mut self, caller: &EthAddress, base_uri: &str) -> SealCredResult<()> {
        self.only_owner(caller)?;
        self.base_uri = base_uri.to_string();
        info!(ledger = %self.address, base_uri, "Base URI updated");
        Ok(())
    }

    /// Overrides the base URI of one deployed derivative, which the ledger
    /// owns.
    pub fn set_derivative_base_uri(
        &mut self,
        caller: &EthAddress,
        derivative: &EthAddress,
        base_uri: &str,
    ) -> SealCredResult<()> {
        self.only_owner(caller)?;
        let ledger = self.address;
        self.derivative_mut(derivative)?.set_base_uri(&ledger, base_uri)
    }

    /// Unregisters `original`. Its derivative stays deployed with its tokens
    /// and nullifiers; the next mint for `original` deploys a fresh one.
    pub fn delete_original(&mut self, caller: &EthAddress, original: &F::Identity) -> SealCredResult<()> {
        self.only_owner(caller)?;
        let removed = self.originals.remove(original);
        info!(
            ledger = %self.address,
            original = %original,
            registered = removed.is_some(),
            "Original deleted"
        );
        self.record(LedgerEvent::DeleteOriginal {
            original: original.to_string(),
        });
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &EthAddress,
        new_owner: EthAddress,
    ) -> SealCredResult<()> {
        self.only_owner(caller)?;
        if new_owner.is_zero() {
            return Err(SealCredError::InvalidAddress(
                "Ownable: new owner is the zero address".into(),
            ));
        }
        let previous_owner = self.owner;
        self.owner = new_owner;
        self.record(LedgerEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }
}
