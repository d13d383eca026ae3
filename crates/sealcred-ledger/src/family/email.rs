use super::{CredentialFamily, OriginMetadata};
use crate::attestation::EcdsaAttestation;
use crate::chain::ChainView;
use crate::signals::{expect_len, packed_bytes, padded_string, PublicSignals};
use sealcred_types::{FieldElement, SealCredError, SealCredResult};
use serde::{Deserialize, Serialize};

/// Bytes reserved for the domain, right-zero-padded.
pub const EMAIL_DOMAIN_LEN: usize = 90;
/// `[domain x90, nullifier, attestor]`
pub const EMAIL_INPUT_LEN: usize = EMAIL_DOMAIN_LEN + 2;

/// Proof of holding an address at an email domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailFamily;

impl CredentialFamily for EmailFamily {
    type Identity = String;

    const NAME: &'static str = "email";
    const INPUT_LEN: usize = EMAIL_INPUT_LEN;

    fn decode(input: &[FieldElement]) -> SealCredResult<PublicSignals<String>> {
        expect_len(input, EMAIL_INPUT_LEN)?;
        let domain = padded_string(&packed_bytes(&input[..EMAIL_DOMAIN_LEN])?)?;
        Ok(PublicSignals {
            attestation_type: None,
            source: None,
            identity: domain,
            network: None,
            token_id: None,
            threshold: None,
            seal_hub_commitment: None,
            nullifier: input[EMAIL_DOMAIN_LEN],
            attestor: input[EMAIL_DOMAIN_LEN + 1],
        })
    }

    fn parse_identity(text: &str) -> SealCredResult<String> {
        if text.len() > EMAIL_DOMAIN_LEN || text.as_bytes().contains(&0) {
            return Err(SealCredError::InvalidPublicInput(format!(
                "{:?} is not a valid email domain",
                text
            )));
        }
        Ok(text.to_string())
    }

    fn identity_mismatch() -> SealCredError {
        SealCredError::WrongEmail
    }

    fn origin_metadata(
        identity: &String,
        _chain: &dyn ChainView,
        _attestation: Option<&EcdsaAttestation>,
    ) -> SealCredResult<OriginMetadata> {
        if identity.is_empty() {
            return Err(SealCredError::UnknownOriginMetadata("empty email domain".into()));
        }
        Ok(OriginMetadata {
            name: format!("@{} email", identity),
            symbol: format!("{}-d", identity),
        })
    }
}
