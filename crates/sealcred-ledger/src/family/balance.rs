use super::{CredentialFamily, OriginMetadata};
use crate::attestation::EcdsaAttestation;
use crate::chain::ChainView;
use crate::signals::{expect_len, saturating_u64, PublicSignals};
use sealcred_types::{EthAddress, FieldElement, Network, SealCredError, SealCredResult};
use serde::{Deserialize, Serialize};

/// `[type, origin, tokenId, network, threshold, sealHubCommitment, nullifier, attestor]`
pub const BALANCE_INPUT_LEN: usize = 8;

/// Holder owns at least `threshold` tokens of the collection.
pub const BALANCE_ATTESTATION: u64 = 0;
/// Holder owns token `tokenId` of the collection.
pub const TOKEN_OWNERSHIP_ATTESTATION: u64 = 1;

const TYPE: usize = 0;
const ORIGIN: usize = 1;
const TOKEN_ID: usize = 2;
const NETWORK: usize = 3;
const THRESHOLD: usize = 4;
const SEAL_HUB_COMMITMENT: usize = 5;
const NULLIFIER: usize = 6;
const ATTESTOR: usize = 7;

fn decode_balance(input: &[FieldElement]) -> SealCredResult<PublicSignals<EthAddress>> {
    expect_len(input, BALANCE_INPUT_LEN)?;
    let identity = input[ORIGIN].to_address().ok_or_else(|| {
        SealCredError::InvalidPublicInput(format!("origin {} is not an address", input[ORIGIN]))
    })?;
    Ok(PublicSignals {
        attestation_type: Some(saturating_u64(&input[TYPE])),
        source: None,
        identity,
        network: Some(saturating_u64(&input[NETWORK])),
        token_id: Some(input[TOKEN_ID]),
        threshold: Some(input[THRESHOLD]),
        seal_hub_commitment: Some(input[SEAL_HUB_COMMITMENT]),
        nullifier: input[NULLIFIER],
        attestor: input[ATTESTOR],
    })
}

/// Balance and ownership proofs over an ERC-721 on this chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Erc721Family;

impl CredentialFamily for Erc721Family {
    type Identity = EthAddress;

    const NAME: &'static str = "erc721";
    const INPUT_LEN: usize = BALANCE_INPUT_LEN;
    const ATTESTATION_TYPES: &'static [u64] = &[BALANCE_ATTESTATION, TOKEN_OWNERSHIP_ATTESTATION];
    const HAS_NETWORK: bool = true;

    fn decode(input: &[FieldElement]) -> SealCredResult<PublicSignals<EthAddress>> {
        decode_balance(input)
    }

    fn parse_identity(text: &str) -> SealCredResult<EthAddress> {
        EthAddress::from_hex(text)
    }

    fn identity_mismatch() -> SealCredError {
        SealCredError::WrongTokenAddress
    }

    fn origin_metadata(
        identity: &EthAddress,
        chain: &dyn ChainView,
        _attestation: Option<&EcdsaAttestation>,
    ) -> SealCredResult<OriginMetadata> {
        let collection = chain
            .collection(identity)
            .filter(|c| !c.name.is_empty() && !c.symbol.is_empty())
            .ok_or_else(|| SealCredError::UnknownOriginMetadata(identity.to_hex()))?;
        Ok(OriginMetadata {
            name: format!("{} (derivative)", collection.name),
            symbol: format!("{}-d", collection.symbol),
        })
    }
}

/// Balance proofs over an ERC-721 living on another chain, vouched for by an
/// ECDSA attestor that also supplies the collection's name and symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalErc721Family;

impl CredentialFamily for ExternalErc721Family {
    type Identity = EthAddress;

    const NAME: &'static str = "external_erc721";
    const INPUT_LEN: usize = BALANCE_INPUT_LEN;
    const ATTESTATION_TYPES: &'static [u64] = &[BALANCE_ATTESTATION, TOKEN_OWNERSHIP_ATTESTATION];
    const HAS_NETWORK: bool = true;
    const REQUIRES_ECDSA: bool = true;

    fn decode(input: &[FieldElement]) -> SealCredResult<PublicSignals<EthAddress>> {
        decode_balance(input)
    }

    fn parse_identity(text: &str) -> SealCredResult<EthAddress> {
        EthAddress::from_hex(text)
    }

    fn identity_mismatch() -> SealCredError {
        SealCredError::WrongTokenAddress
    }

    fn origin_metadata(
        _identity: &EthAddress,
        _chain: &dyn ChainView,
        attestation: Option<&EcdsaAttestation>,
    ) -> SealCredResult<OriginMetadata> {
        let message = attestation
            .ok_or(SealCredError::EcdsaAttestationRequired)?
            .parsed()?;
        Ok(OriginMetadata {
            name: message.name,
            symbol: message.symbol,
        })
    }

    fn check_attestation(
        identity: &EthAddress,
        network: Option<Network>,
        attestor: Option<&EthAddress>,
        attestation: Option<&EcdsaAttestation>,
    ) -> SealCredResult<()> {
        let attestation = attestation.ok_or(SealCredError::EcdsaAttestationRequired)?;
        let network = network
            .ok_or_else(|| SealCredError::Internal("external derivative without network".into()))?;
        let attestor = attestor.ok_or_else(|| {
            SealCredError::Internal("external derivative without ECDSA attestor".into())
        })?;
        let message = attestation.verify(identity, network, attestor)?;
        // The signed name and symbol become the derivative's metadata.
        if message.name.is_empty() {
            return Err(SealCredError::ZeroNameLength);
        }
        if message.symbol.is_empty() {
            return Err(SealCredError::ZeroSymbolLength);
        }
        Ok(())
    }
}
