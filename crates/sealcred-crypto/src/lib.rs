//! Primitives the ledgers rely on: CREATE addresses, ECDSA attestation
//! recovery and Groth16 proof verification.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod address;
pub mod ecdsa;
pub mod groth16;

pub use address::*;
pub use ecdsa::*;
pub use groth16::*;
