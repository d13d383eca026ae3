use thiserror::Error;

/// Every failure a ledger or derivative call can revert with, plus the
/// infrastructure failures of the surrounding tooling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SealCredError {
    #[error("Ownable: caller is not the owner")]
    NotOwner,

    #[error("Invalid attestation type: {0}")]
    InvalidAttestationType(u64),

    #[error("This ZK proof is not from the correct attestation source")]
    WrongAttestationSource,

    #[error("This ZK proof is not from the correct token contract")]
    WrongTokenAddress,

    #[error("This ZK proof is not from the correct email")]
    WrongEmail,

    #[error("Unexpected network")]
    WrongNetwork,

    #[error("This ZK proof is not from the correct attestor")]
    WrongAttestor,

    #[error("Wrong attestor public key")]
    WrongEcdsaAttestor,

    #[error("Error while verifying the ECDSA signature: {0}")]
    EcdsaVerificationError(String),

    #[error("Mint with ECDSA signature should be used")]
    EcdsaAttestationRequired,

    #[error("This ZK proof has already been used")]
    ProofAlreadyUsed,

    #[error("Invalid ZK proof")]
    InvalidProof,

    #[error("SealHub commitment root is not valid")]
    InvalidSealHubCommitment,

    #[error("This token is soulbound")]
    SoulboundToken,

    #[error("Nonexistent token: {0}")]
    NonexistentToken(u64),

    #[error("Zero name length")]
    ZeroNameLength,

    #[error("Zero symbol length")]
    ZeroSymbolLength,

    #[error("Unknown origin metadata: {0}")]
    UnknownOriginMetadata(String),

    #[error("No verifier contract deployed at {0}")]
    UnknownVerifier(String),

    #[error("Unknown derivative: {0}")]
    UnknownDerivative(String),

    #[error("Invalid public input: {0}")]
    InvalidPublicInput(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid key format: {0}")]
    InvalidKey(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result alias used across the workspace.
pub type SealCredResult<T> = Result<T, SealCredError>;
