use sealcred_types::{EthAddress, FieldElement};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Events a ledger or derivative emits, in emission order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    CreateDerivative {
        original: String,
        derivative: EthAddress,
    },
    DeleteOriginal {
        original: String,
    },
    Mint {
        derivative: EthAddress,
        to: EthAddress,
        token_id: u64,
    },
    OwnershipTransferred {
        previous_owner: EthAddress,
        new_owner: EthAddress,
    },
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::CreateDerivative {
                original,
                derivative,
            } => write!(f, "CreateDerivative({}, {})", original, derivative),
            LedgerEvent::DeleteOriginal { original } => write!(f, "DeleteOriginal({})", original),
            LedgerEvent::Mint {
                derivative,
                to,
                token_id,
            } => write!(f, "Mint({}, {}, {})", derivative, to, token_id),
            LedgerEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => write!(f, "OwnershipTransferred({}, {})", previous_owner, new_owner),
        }
    }
}

/// Outcome of a successful mint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub derivative: EthAddress,
    pub to: EthAddress,
    pub token_id: u64,
    pub nullifier: FieldElement,
    /// Whether this mint deployed the derivative.
    pub created: bool,
}

impl fmt::Display for MintReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Minted token {} to {}", self.token_id, self.to)?;
        writeln!(
            f,
            "  Derivative: {}{}",
            self.derivative,
            if self.created { " (new)" } else { "" }
        )?;
        writeln!(f, "  Nullifier: {}", self.nullifier)
    }
}
