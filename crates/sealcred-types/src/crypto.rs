use crate::error::{SealCredError, SealCredResult};
use crate::field::FieldElement;
use crate::{ECDSA_COMPACT_SIGNATURE_SIZE, ECDSA_SIGNATURE_SIZE, SECP256K1_PRIVATE_KEY_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A Groth16 proof in the calldata shape of `verifyProof(a, b, c, input)`.
///
/// `b` follows the EVM precompile ordering: each G2 coordinate is given as
/// `[c1, c0]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkProof {
    /// G1 point `A`.
    pub a: [FieldElement; 2],
    /// G2 point `B`.
    pub b: [[FieldElement; 2]; 2],
    /// G1 point `C`.
    pub c: [FieldElement; 2],
    /// Public-input vector.
    pub input: Vec<FieldElement>,
}

impl ZkProof {
    /// A proof with placeholder curve points, for verifiers that ignore them.
    pub fn with_input(input: Vec<FieldElement>) -> Self {
        Self {
            a: [FieldElement::from_u64(1), FieldElement::from_u64(2)],
            b: [
                [FieldElement::from_u64(1), FieldElement::from_u64(2)],
                [FieldElement::from_u64(3), FieldElement::from_u64(4)],
            ],
            c: [FieldElement::from_u64(1), FieldElement::from_u64(2)],
            input,
        }
    }
}

/// A legacy `(r, s, v)` ECDSA signature.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    /// `r` scalar.
    pub r: [u8; 32],
    /// `s` scalar.
    pub s: [u8; 32],
    /// Recovery byte, 27/28 or 0/1.
    pub v: u8,
}

impl EcdsaSignature {
    /// Assembles a signature from its parts.
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// `r || s || v`.
    pub fn to_bytes(&self) -> [u8; ECDSA_SIGNATURE_SIZE] {
        let mut bytes = [0u8; ECDSA_SIGNATURE_SIZE];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// Inverse of [`EcdsaSignature::to_bytes`].
    pub fn from_bytes(bytes: &[u8; ECDSA_SIGNATURE_SIZE]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Self {
            r,
            s,
            v: bytes[64],
        }
    }

    /// EIP-2098 form: the parity of `v` folded into the top bit of `s`.
    pub fn to_compact(&self) -> CompactSignature {
        let mut y_parity_and_s = self.s;
        let parity = if self.v >= 27 { self.v - 27 } else { self.v };
        if parity == 1 {
            y_parity_and_s[0] |= 0x80;
        }
        CompactSignature {
            r: self.r,
            y_parity_and_s,
        }
    }
}

impl fmt::Debug for EcdsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcdsaSignature(v={})", self.v)
    }
}

/// An EIP-2098 `(r, yParityAndS)` signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactSignature {
    /// `r` scalar.
    pub r: [u8; 32],
    /// `s` with the recovery parity in its top bit.
    pub y_parity_and_s: [u8; 32],
}

impl CompactSignature {
    /// Unfolds into `(r, s, v)` with `v` in `{27, 28}`.
    pub fn to_legacy(&self) -> EcdsaSignature {
        let mut s = self.y_parity_and_s;
        let parity = s[0] >> 7;
        s[0] &= 0x7f;
        EcdsaSignature::new(self.r, s, 27 + parity)
    }

    /// `r || yParityAndS`.
    pub fn to_bytes(&self) -> [u8; ECDSA_COMPACT_SIGNATURE_SIZE] {
        let mut bytes = [0u8; ECDSA_COMPACT_SIGNATURE_SIZE];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..].copy_from_slice(&self.y_parity_and_s);
        bytes
    }
}

/// The two signature encodings an attestation may arrive in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureParts {
    /// `(v, r, s)`.
    Legacy(EcdsaSignature),
    /// `(r, yParityAndS)`.
    Compact(CompactSignature),
}

impl SignatureParts {
    /// Parses 65-byte `r || s || v` or 64-byte `r || yParityAndS` encodings.
    pub fn from_slice(bytes: &[u8]) -> SealCredResult<Self> {
        match bytes.len() {
            ECDSA_SIGNATURE_SIZE => {
                let mut arr = [0u8; ECDSA_SIGNATURE_SIZE];
                arr.copy_from_slice(bytes);
                Ok(SignatureParts::Legacy(EcdsaSignature::from_bytes(&arr)))
            }
            ECDSA_COMPACT_SIGNATURE_SIZE => {
                let mut r = [0u8; 32];
                let mut y_parity_and_s = [0u8; 32];
                r.copy_from_slice(&bytes[..32]);
                y_parity_and_s.copy_from_slice(&bytes[32..]);
                Ok(SignatureParts::Compact(CompactSignature { r, y_parity_and_s }))
            }
            other => Err(SealCredError::EcdsaVerificationError(format!(
                "invalid signature length {}",
                other
            ))),
        }
    }

    /// Wire bytes in whichever encoding this signature arrived in.
    pub fn to_vec(&self) -> Vec<u8> {
        match self {
            SignatureParts::Legacy(sig) => sig.to_bytes().to_vec(),
            SignatureParts::Compact(sig) => sig.to_bytes().to_vec(),
        }
    }

    /// Normalizes to `(r, s, v)`.
    pub fn to_legacy(&self) -> EcdsaSignature {
        match self {
            SignatureParts::Legacy(sig) => sig.clone(),
            SignatureParts::Compact(sig) => sig.to_legacy(),
        }
    }
}

/// A secp256k1 signing key, zeroed on drop.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Secp256k1PrivateKey(pub [u8; SECP256K1_PRIVATE_KEY_SIZE]);

impl Secp256k1PrivateKey {
    /// Wraps raw key bytes.
    pub fn from_bytes(bytes: [u8; SECP256K1_PRIVATE_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; SECP256K1_PRIVATE_KEY_SIZE] {
        &self.0
    }

    /// Parses hex with or without `0x`.
    pub fn from_hex(s: &str) -> SealCredResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| SealCredError::InvalidKey(e.to_string()))?;
        if bytes.len() != SECP256K1_PRIVATE_KEY_SIZE {
            return Err(SealCredError::InvalidKey("Invalid private key length".into()));
        }
        let mut arr = [0u8; SECP256K1_PRIVATE_KEY_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Secp256k1PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secp256k1PrivateKey([REDACTED])")
    }
}
