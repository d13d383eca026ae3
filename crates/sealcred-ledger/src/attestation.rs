//! Cross-chain ECDSA attestations for the external ERC-721 ledger.
//!
//! The attestor signs, as an EIP-191 personal message, the bytes
//!
//! ```text
//! ascii(lowercase "0x" origin address) || network byte || name || 0x00 || symbol
//! ```

use sealcred_crypto::{recover_personal_signer, sign_personal};
use sealcred_types::{
    EthAddress, Network, SealCredError, SealCredResult, Secp256k1PrivateKey, SignatureParts,
};
use serde::{Deserialize, Serialize};

const ORIGIN_TEXT_LEN: usize = 42;

fn malformed(reason: &str) -> SealCredError {
    SealCredError::EcdsaVerificationError(format!("malformed attestation message: {}", reason))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationMessage {
    pub origin: EthAddress,
    pub network: u8,
    pub name: String,
    pub symbol: String,
}

impl AttestationMessage {
    pub fn new(origin: EthAddress, network: Network, name: &str, symbol: &str) -> Self {
        Self {
            origin,
            network: network.code(),
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(ORIGIN_TEXT_LEN + 2 + self.name.len() + self.symbol.len());
        bytes.extend_from_slice(self.origin.to_hex().as_bytes());
        bytes.push(self.network);
        bytes.extend_from_slice(self.name.as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(self.symbol.as_bytes());
        bytes
    }

    pub fn parse(bytes: &[u8]) -> SealCredResult<Self> {
        if bytes.len() < ORIGIN_TEXT_LEN + 2 {
            return Err(malformed("too short"));
        }
        let origin_text = std::str::from_utf8(&bytes[..ORIGIN_TEXT_LEN])
            .map_err(|_| malformed("origin is not ascii"))?;
        let origin = EthAddress::from_hex(origin_text).map_err(|_| malformed("origin is not an address"))?;
        let network = bytes[ORIGIN_TEXT_LEN];

        let rest = &bytes[ORIGIN_TEXT_LEN + 1..];
        let separator = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| malformed("missing name/symbol separator"))?;
        let (name, symbol) = (&rest[..separator], &rest[separator + 1..]);
        if symbol.contains(&0) {
            return Err(malformed("symbol contains a null byte"));
        }

        Ok(Self {
            origin,
            network,
            name: String::from_utf8(name.to_vec()).map_err(|_| malformed("name is not utf-8"))?,
            symbol: String::from_utf8(symbol.to_vec())
                .map_err(|_| malformed("symbol is not utf-8"))?,
        })
    }
}

/// The signed message bytes together with the signature over them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaAttestation {
    pub message: Vec<u8>,
    pub signature: SignatureParts,
}

impl EcdsaAttestation {
    /// Signs `message` and keeps the EIP-2098 compact form, which is what
    /// attestors hand out.
    pub fn sign(message: &AttestationMessage, key: &Secp256k1PrivateKey) -> SealCredResult<Self> {
        let bytes = message.to_bytes();
        let signature = sign_personal(key, &bytes)?;
        Ok(Self {
            message: bytes,
            signature: SignatureParts::Compact(signature.to_compact()),
        })
    }

    pub fn from_slices(message: &[u8], signature: &[u8]) -> SealCredResult<Self> {
        Ok(Self {
            message: message.to_vec(),
            signature: SignatureParts::from_slice(signature)?,
        })
    }

    pub fn parsed(&self) -> SealCredResult<AttestationMessage> {
        AttestationMessage::parse(&self.message)
    }

    pub fn recover_signer(&self) -> SealCredResult<EthAddress> {
        recover_personal_signer(&self.message, &self.signature)
    }

    /// Checks the message against the proof it accompanies, then the signer.
    pub fn verify(
        &self,
        origin: &EthAddress,
        network: Network,
        attestor: &EthAddress,
    ) -> SealCredResult<AttestationMessage> {
        let message = self.parsed()?;
        if message.origin != *origin {
            return Err(SealCredError::WrongTokenAddress);
        }
        if message.network != network.code() {
            return Err(SealCredError::WrongNetwork);
        }
        let signer = self.recover_signer()?;
        if !sealcred_crypto::addresses_match(&signer, attestor) {
            return Err(SealCredError::WrongEcdsaAttestor);
        }
        Ok(message)
    }
}
