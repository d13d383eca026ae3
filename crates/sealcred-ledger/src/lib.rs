#![deny(unsafe_code)]
#![warn(clippy::all)]
//! Credential ledgers and their soulbound derivative collections.
//!
//! A [`Ledger`] maps an origin identity (an ERC-721 contract, an email
//! domain, the Farcaster community) to the one [`Derivative`] that mints
//! credentials for it. Each credential family decodes its own public-input
//! layout through [`CredentialFamily`]; everything else is shared.

pub mod attestation;
pub mod chain;
pub mod derivative;
pub mod events;
pub mod family;
pub mod ledger;
pub mod nullifier;
pub mod signals;

#[cfg(test)]
mod tests;

pub use attestation::{AttestationMessage, EcdsaAttestation};
pub use chain::{ChainView, CollectionMetadata, MemoryChain};
pub use derivative::{Derivative, DerivativeParams};
pub use events::{LedgerEvent, MintReceipt};
pub use family::{
    CredentialFamily, EmailFamily, Erc721Family, ExternalErc721Family, FarcasterFamily,
    OriginMetadata,
};
pub use ledger::{Ledger, LedgerParams};
pub use nullifier::NullifierSet;
pub use signals::PublicSignals;
