#![forbid(unsafe_code)]
#![warn(clippy::all)]
//! Value types shared by every SealCred crate.
//!
//! All on-chain quantities are modelled the way the EVM sees them: addresses
//! are 20 raw bytes, every public-input slot of a proof is a big-endian
//! `uint256`, and signatures are split into their `(r, s, v)` parts.

mod address;
mod crypto;
mod error;
mod field;

pub use address::EthAddress;
pub use crypto::{
    CompactSignature, EcdsaSignature, Secp256k1PrivateKey, SignatureParts, ZkProof,
};
pub use error::{SealCredError, SealCredResult};
pub use field::{FieldElement, Network};

/// Size of an Ethereum address in bytes.
pub const ETH_ADDRESS_SIZE: usize = 20;

/// Size of a `uint256` word in bytes.
pub const FIELD_ELEMENT_SIZE: usize = 32;

/// Size of a secp256k1 private key in bytes.
pub const SECP256K1_PRIVATE_KEY_SIZE: usize = 32;

/// Size of a `(r, s, v)` signature in bytes.
pub const ECDSA_SIGNATURE_SIZE: usize = 65;

/// Size of an EIP-2098 `(r, yParityAndS)` signature in bytes.
pub const ECDSA_COMPACT_SIGNATURE_SIZE: usize = 64;
