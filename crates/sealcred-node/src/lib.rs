#![allow(missing_docs)]
#![warn(clippy::all)]
//! Operator node for SealCred ledgers: configuration, sled persistence and a
//! serialized service over every ledger and derivative call.

pub mod config;
pub mod kind;
pub mod service;
pub mod storage;

pub use config::{NodeConfig, VerifierEntry, VerifierKind};
pub use kind::LedgerKind;
pub use service::{decode_signals, DerivativeSummary, LedgerService, LedgerSummary};
pub use storage::{DeploymentRecord, LedgerStore, StorageConfig};
