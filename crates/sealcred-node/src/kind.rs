use sealcred_ledger::{CredentialFamily, EmailFamily, Erc721Family, ExternalErc721Family, FarcasterFamily};
use serde::{Deserialize, Serialize};

/// Which credential family a deployed ledger belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Erc721,
    ExternalErc721,
    Email,
    Farcaster,
}

impl LedgerKind {
    pub const ALL: [LedgerKind; 4] = [
        LedgerKind::Erc721,
        LedgerKind::ExternalErc721,
        LedgerKind::Email,
        LedgerKind::Farcaster,
    ];

    /// Also the name of the storage tree holding this family's ledgers.
    pub fn name(&self) -> &'static str {
        match self {
            LedgerKind::Erc721 => Erc721Family::NAME,
            LedgerKind::ExternalErc721 => ExternalErc721Family::NAME,
            LedgerKind::Email => EmailFamily::NAME,
            LedgerKind::Farcaster => FarcasterFamily::NAME,
        }
    }

    pub fn has_network(&self) -> bool {
        matches!(self, LedgerKind::Erc721 | LedgerKind::ExternalErc721)
    }
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs `$body` with `$family` bound to the family type behind `$kind`.
#[macro_export]
macro_rules! with_family {
    ($kind:expr, $family:ident => $body:expr) => {
        match $kind {
            $crate::LedgerKind::Erc721 => {
                type $family = sealcred_ledger::Erc721Family;
                $body
            }
            $crate::LedgerKind::ExternalErc721 => {
                type $family = sealcred_ledger::ExternalErc721Family;
                $body
            }
            $crate::LedgerKind::Email => {
                type $family = sealcred_ledger::EmailFamily;
                $body
            }
            $crate::LedgerKind::Farcaster => {
                type $family = sealcred_ledger::FarcasterFamily;
                $body
            }
        }
    };
}
