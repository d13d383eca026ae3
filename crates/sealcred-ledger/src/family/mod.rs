//! Per-family strategies: public-input layout, identity type and how a new
//! derivative is named.

mod balance;
mod email;
mod farcaster;

pub use balance::{
    Erc721Family, ExternalErc721Family, BALANCE_ATTESTATION, BALANCE_INPUT_LEN,
    TOKEN_OWNERSHIP_ATTESTATION,
};
pub use email::{EmailFamily, EMAIL_DOMAIN_LEN, EMAIL_INPUT_LEN};
pub use farcaster::{FarcasterFamily, FARCASTER_INPUT_LEN, FARCASTER_MEMBERSHIP_ATTESTATION};

use crate::attestation::EcdsaAttestation;
use crate::chain::ChainView;
use crate::signals::PublicSignals;
use sealcred_types::{EthAddress, FieldElement, Network, SealCredError, SealCredResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Name and symbol of a derivative collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginMetadata {
    pub name: String,
    pub symbol: String,
}

pub trait CredentialFamily: Clone + fmt::Debug + Send + Sync + 'static {
    type Identity: Clone
        + Eq
        + Ord
        + Hash
        + fmt::Debug
        + fmt::Display
        + Serialize
        + DeserializeOwned
        + Send
        + Sync;

    /// Storage and log name.
    const NAME: &'static str;

    /// Exact public-input width.
    const INPUT_LEN: usize;

    /// Accepted attestation-type discriminants. Ignored when the layout has
    /// no type field.
    const ATTESTATION_TYPES: &'static [u64] = &[];

    /// Keyword the proof must embed, if the layout carries one.
    const SOURCE: Option<&'static str> = None;

    /// Whether proofs carry a network code; ledgers of such families must be
    /// configured with one.
    const HAS_NETWORK: bool = false;

    /// Whether every mint must come with an ECDSA attestation.
    const REQUIRES_ECDSA: bool = false;

    fn decode(input: &[FieldElement]) -> SealCredResult<PublicSignals<Self::Identity>>;

    fn parse_identity(text: &str) -> SealCredResult<Self::Identity>;

    /// Error for a proof about a different origin.
    fn identity_mismatch() -> SealCredError;

    /// Name and symbol for the first derivative of `identity`.
    fn origin_metadata(
        identity: &Self::Identity,
        chain: &dyn ChainView,
        attestation: Option<&EcdsaAttestation>,
    ) -> SealCredResult<OriginMetadata>;

    /// Authority check beyond the proof itself. Runs after the verifier.
    fn check_attestation(
        _identity: &Self::Identity,
        _network: Option<Network>,
        _attestor: Option<&EthAddress>,
        _attestation: Option<&EcdsaAttestation>,
    ) -> SealCredResult<()> {
        Ok(())
    }
}
