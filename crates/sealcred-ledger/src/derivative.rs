use crate::attestation::EcdsaAttestation;
use crate::chain::ChainView;
use crate::events::{LedgerEvent, MintReceipt};
use crate::family::CredentialFamily;
use crate::nullifier::NullifierSet;
use sealcred_types::{EthAddress, FieldElement, Network, SealCredError, SealCredResult, ZkProof};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

/// Constructor arguments of a derivative. Verifier, attestor and network are
/// copies taken at deployment, not references to the ledger.
#[derive(Clone, Debug)]
pub struct DerivativeParams<F: CredentialFamily> {
    pub address: EthAddress,
    pub owner: EthAddress,
    pub ledger: EthAddress,
    pub original: F::Identity,
    pub verifier_contract: EthAddress,
    pub attestor_public_key: FieldElement,
    pub network: Option<Network>,
    pub attestor_ecdsa_address: Option<EthAddress>,
    pub seal_hub: Option<EthAddress>,
    pub name: String,
    pub symbol: String,
    pub base_uri: String,
    pub version: String,
}

/// A soulbound collection bound to one origin identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Derivative<F: CredentialFamily> {
    address: EthAddress,
    owner: EthAddress,
    ledger: EthAddress,
    original: F::Identity,
    verifier_contract: EthAddress,
    attestor_public_key: FieldElement,
    network: Option<Network>,
    attestor_ecdsa_address: Option<EthAddress>,
    seal_hub: Option<EthAddress>,
    name: String,
    symbol: String,
    base_uri: String,
    version: String,
    nullifiers: NullifierSet,
    owners: BTreeMap<u64, EthAddress>,
    balances: BTreeMap<EthAddress, u64>,
    next_token_id: u64,
    events: Vec<LedgerEvent>,
    #[serde(skip)]
    _family: PhantomData<F>,
}

impl<F: CredentialFamily> Derivative<F> {
    pub fn new(params: DerivativeParams<F>) -> SealCredResult<Self> {
        if params.name.is_empty() {
            return Err(SealCredError::ZeroNameLength);
        }
        if params.symbol.is_empty() {
            return Err(SealCredError::ZeroSymbolLength);
        }
        if F::HAS_NETWORK && params.network.is_none() {
            return Err(SealCredError::Config(format!(
                "{} derivative requires a network",
                F::NAME
            )));
        }
        if F::REQUIRES_ECDSA && params.attestor_ecdsa_address.is_none() {
            return Err(SealCredError::Config(format!(
                "{} derivative requires an ECDSA attestor address",
                F::NAME
            )));
        }
        Ok(Self {
            address: params.address,
            owner: params.owner,
            ledger: params.ledger,
            original: params.original,
            verifier_contract: params.verifier_contract,
            attestor_public_key: params.attestor_public_key,
            network: params.network,
            attestor_ecdsa_address: params.attestor_ecdsa_address,
            seal_hub: params.seal_hub,
            name: params.name,
            symbol: params.symbol,
            base_uri: params.base_uri,
            version: params.version,
            nullifiers: NullifierSet::new(),
            owners: BTreeMap::new(),
            balances: BTreeMap::new(),
            next_token_id: 0,
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

    pub fn ledger(&self) -> EthAddress {
        self.ledger
    }

    pub fn original(&self) -> &F::Identity {
        &self.original
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

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn total_supply(&self) -> u64 {
        self.next_token_id
    }

    pub fn balance_of(&self, account: &EthAddress) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn owner_of(&self, token_id: u64) -> SealCredResult<EthAddress> {
        self.owners
            .get(&token_id)
            .copied()
            .ok_or(SealCredError::NonexistentToken(token_id))
    }

    /// Whether `nullifier` has been consumed by this derivative.
    pub fn is_nullifier_used(&self, nullifier: &FieldElement) -> bool {
        self.nullifiers.contains(nullifier)
    }

    pub fn nullifiers(&self) -> &NullifierSet {
        &self.nullifiers
    }

    /// Mint and ownership events, in emission order.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// `{baseURI}/{derivative address}/{tokenId}`. The base URI is kept as
    /// given; the address is rendered in lowercase hex.
    pub fn token_uri(&self, token_id: u64) -> SealCredResult<String> {
        self.owner_of(token_id)?;
        Ok(format!("{}/{}/{}", self.base_uri, self.address.to_hex(), token_id))
    }

    pub fn mint(
        &mut self,
        caller: EthAddress,
        proof: &ZkProof,
        chain: &dyn ChainView,
    ) -> SealCredResult<MintReceipt> {
        self.mint_with(caller, proof, None, chain)
    }

    pub fn mint_with_attestation(
        &mut self,
        caller: EthAddress,
        proof: &ZkProof,
        attestation: &EcdsaAttestation,
        chain: &dyn ChainView,
    ) -> SealCredResult<MintReceipt> {
        self.mint_with(caller, proof, Some(attestation), chain)
    }

    pub(crate) fn mint_with(
        &mut self,
        caller: EthAddress,
        proof: &ZkProof,
        attestation: Option<&EcdsaAttestation>,
        chain: &dyn ChainView,
    ) -> SealCredResult<MintReceipt> {
        let nullifier = match self.check_mint(proof, attestation, chain) {
            Ok(nullifier) => nullifier,
            Err(e) => {
                warn!(
                    family = F::NAME,
                    derivative = %self.address,
                    original = %self.original,
                    "Mint rejected: {}",
                    e
                );
                return Err(e);
            }
        };

        Ok(self.record_mint(caller, nullifier))
    }

    /// Consumes `nullifier` and assigns the next token id to `caller`.
    /// The mint must already have passed [`Derivative::check_mint`].
    pub(crate) fn record_mint(&mut self, caller: EthAddress, nullifier: FieldElement) -> MintReceipt {
        self.nullifiers.insert(nullifier);
        let token_id = self.next_token_id;
        self.next_token_id += 1;
        self.owners.insert(token_id, caller);
        *self.balances.entry(caller).or_insert(0) += 1;
        self.events.push(LedgerEvent::Mint {
            derivative: self.address,
            to: caller,
            token_id,
        });

        info!(
            family = F::NAME,
            derivative = %self.address,
            to = %caller,
            token_id,
            "Minted derivative token"
        );

        MintReceipt {
            derivative: self.address,
            to: caller,
            token_id,
            nullifier,
            created: false,
        }
    }

    /// Runs every acceptance check without touching state and returns the
    /// nullifier to consume.
    pub fn check_mint(
        &self,
        proof: &ZkProof,
        attestation: Option<&EcdsaAttestation>,
        chain: &dyn ChainView,
    ) -> SealCredResult<FieldElement> {
        self.terms().check(proof, attestation, chain)
    }

    fn terms(&self) -> MintTerms<'_, F> {
        MintTerms {
            derivative: self.address,
            original: &self.original,
            verifier_contract: self.verifier_contract,
            attestor_public_key: self.attestor_public_key,
            network: self.network,
            attestor_ecdsa_address: self.attestor_ecdsa_address,
            seal_hub: self.seal_hub,
            nullifiers: &self.nullifiers,
        }
    }

    /// Tokens never move after mint.
    pub fn transfer_from(
        &mut self,
        _from: EthAddress,
        _to: EthAddress,
        _token_id: u64,
    ) -> SealCredResult<()> {
        Err(SealCredError::SoulboundToken)
    }

    pub fn safe_transfer_from(
        &mut self,
        _from: EthAddress,
        _to: EthAddress,
        _token_id: u64,
    ) -> SealCredResult<()> {
        Err(SealCredError::SoulboundToken)
    }

    pub fn approve(&mut self, _to: EthAddress, _token_id: u64) -> SealCredResult<()> {
        Err(SealCredError::SoulboundToken)
    }

    pub fn set_approval_for_all(
        &mut self,
        _operator: EthAddress,
        _approved: bool,
    ) -> SealCredResult<()> {
        Err(SealCredError::SoulboundToken)
    }

    fn only_owner(&self, caller: &EthAddress) -> SealCredResult<()> {
        if *caller != self.owner {
            return Err(SealCredError::NotOwner);
        }
        Ok(())
    }

    pub fn set_base_uri(&mut self, caller: &EthAddress, base_uri: &str) -> SealCredResult<()> {
        self.only_owner(caller)?;
        self.base_uri = base_uri.to_string();
        info!(derivative = %self.address, base_uri, "Derivative base URI updated");
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
        self.events.push(LedgerEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }
}

/// What a mint is checked against: the configuration of an existing
/// derivative, or the ledger's configuration for one it is about to deploy.
pub(crate) struct MintTerms<'a, F: CredentialFamily> {
    pub derivative: EthAddress,
    pub original: &'a F::Identity,
    pub verifier_contract: EthAddress,
    pub attestor_public_key: FieldElement,
    pub network: Option<Network>,
    pub attestor_ecdsa_address: Option<EthAddress>,
    pub seal_hub: Option<EthAddress>,
    pub nullifiers: &'a NullifierSet,
}

impl<F: CredentialFamily> MintTerms<'_, F> {
    /// Cheap field comparisons run before the verifier call, and the ECDSA
    /// attestation is checked last.
    pub fn check(
        &self,
        proof: &ZkProof,
        attestation: Option<&EcdsaAttestation>,
        chain: &dyn ChainView,
    ) -> SealCredResult<FieldElement> {
        if F::REQUIRES_ECDSA && attestation.is_none() {
            return Err(SealCredError::EcdsaAttestationRequired);
        }

        let signals = F::decode(&proof.input)?;

        if let Some(attestation_type) = signals.attestation_type {
            if !F::ATTESTATION_TYPES.contains(&attestation_type) {
                return Err(SealCredError::InvalidAttestationType(attestation_type));
            }
        }

        if let Some(expected) = F::SOURCE {
            if signals.source.as_deref() != Some(expected) {
                return Err(SealCredError::WrongAttestationSource);
            }
        }

        if signals.identity != *self.original {
            return Err(F::identity_mismatch());
        }

        if let (Some(code), Some(network)) = (signals.network, self.network) {
            if code != network.code() as u64 {
                return Err(SealCredError::WrongNetwork);
            }
        }

        if signals.attestor != self.attestor_public_key {
            return Err(SealCredError::WrongAttestor);
        }

        if let (Some(seal_hub), Some(commitment)) = (self.seal_hub, signals.seal_hub_commitment) {
            if !chain.is_seal_hub_root(&seal_hub, &commitment) {
                return Err(SealCredError::InvalidSealHubCommitment);
            }
        }

        if self.nullifiers.contains(&signals.nullifier) {
            return Err(SealCredError::ProofAlreadyUsed);
        }

        let verifier = chain
            .verifier(&self.verifier_contract)
            .ok_or_else(|| SealCredError::UnknownVerifier(self.verifier_contract.to_hex()))?;
        if !verifier.verify_proof(proof)? {
            return Err(SealCredError::InvalidProof);
        }
        debug!(derivative = %self.derivative, "Proof accepted by verifier");

        F::check_attestation(
            self.original,
            self.network,
            self.attestor_ecdsa_address.as_ref(),
            attestation,
        )?;

        Ok(signals.nullifier)
    }
}
