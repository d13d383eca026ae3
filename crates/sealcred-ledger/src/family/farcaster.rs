use super::{CredentialFamily, OriginMetadata};
use crate::attestation::EcdsaAttestation;
use crate::chain::ChainView;
use crate::signals::{expect_len, packed_bytes, saturating_u64, PublicSignals};
use sealcred_types::{FieldElement, SealCredError, SealCredResult};
use serde::{Deserialize, Serialize};

const KEYWORD: &str = "farcaster";

/// `[type, 'farcaster' x9, nullifier, attestor]`
pub const FARCASTER_INPUT_LEN: usize = KEYWORD.len() + 3;

pub const FARCASTER_MEMBERSHIP_ATTESTATION: u64 = 0;

/// Proof of holding a Farcaster account. Every proof is about the same
/// origin, so a Farcaster ledger has a single derivative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarcasterFamily;

impl FarcasterFamily {
    pub fn identity() -> String {
        KEYWORD.to_string()
    }
}

impl CredentialFamily for FarcasterFamily {
    type Identity = String;

    const NAME: &'static str = "farcaster";
    const INPUT_LEN: usize = FARCASTER_INPUT_LEN;
    const ATTESTATION_TYPES: &'static [u64] = &[FARCASTER_MEMBERSHIP_ATTESTATION];
    const SOURCE: Option<&'static str> = Some(KEYWORD);

    fn decode(input: &[FieldElement]) -> SealCredResult<PublicSignals<String>> {
        expect_len(input, FARCASTER_INPUT_LEN)?;
        let keyword_end = 1 + KEYWORD.len();
        let source = String::from_utf8_lossy(&packed_bytes(&input[1..keyword_end])?).into_owned();
        Ok(PublicSignals {
            attestation_type: Some(saturating_u64(&input[0])),
            source: Some(source.clone()),
            identity: source,
            network: None,
            token_id: None,
            threshold: None,
            seal_hub_commitment: None,
            nullifier: input[keyword_end],
            attestor: input[keyword_end + 1],
        })
    }

    fn parse_identity(text: &str) -> SealCredResult<String> {
        Ok(text.to_ascii_lowercase())
    }

    fn identity_mismatch() -> SealCredError {
        SealCredError::WrongAttestationSource
    }

    fn origin_metadata(
        identity: &String,
        _chain: &dyn ChainView,
        _attestation: Option<&EcdsaAttestation>,
    ) -> SealCredResult<OriginMetadata> {
        if identity.is_empty() {
            return Err(SealCredError::UnknownOriginMetadata("empty farcaster origin".into()));
        }
        Ok(OriginMetadata {
            name: format!("@{}", identity),
            symbol: format!("{}-d", identity),
        })
    }
}
