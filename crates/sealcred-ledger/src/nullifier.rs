use sealcred_types::FieldElement;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Nullifiers consumed by one derivative. Entries are never evicted: a
/// nullifier that has been used stays used.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullifierSet {
    used: BTreeSet<FieldElement>,
}

impl NullifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, nullifier: &FieldElement) -> bool {
        self.used.contains(nullifier)
    }

    /// Marks `nullifier` used. Returns `false` if it already was.
    pub fn insert(&mut self, nullifier: FieldElement) -> bool {
        self.used.insert(nullifier)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldElement> {
        self.used.iter()
    }
}
