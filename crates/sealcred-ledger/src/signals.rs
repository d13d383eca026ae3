//! Shape-level decoding of public-input vectors.
//!
//! Decoding only rejects vectors that cannot be read at all (wrong length,
//! a byte slot holding a value above 255, an origin wider than an address).
//! Whether the decoded values are *acceptable* is decided by the derivative.

use sealcred_types::{FieldElement, SealCredError, SealCredResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named fields of one proof's public input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSignals<I> {
    /// Attestation-type discriminant, for families that carry one.
    pub attestation_type: Option<u64>,
    /// Embedded family keyword, for families that carry one.
    pub source: Option<String>,
    pub identity: I,
    /// Raw network code, for balance families.
    pub network: Option<u64>,
    pub token_id: Option<FieldElement>,
    pub threshold: Option<FieldElement>,
    pub seal_hub_commitment: Option<FieldElement>,
    pub nullifier: FieldElement,
    pub attestor: FieldElement,
}

impl<I: fmt::Display> fmt::Display for PublicSignals<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(attestation_type) = self.attestation_type {
            writeln!(f, "Attestation type: {}", attestation_type)?;
        }
        if let Some(source) = &self.source {
            writeln!(f, "Source: {}", source)?;
        }
        writeln!(f, "Identity: {}", self.identity)?;
        if let Some(network) = self.network {
            writeln!(f, "Network: {}", network)?;
        }
        if let Some(token_id) = &self.token_id {
            writeln!(f, "Token id: {}", token_id)?;
        }
        if let Some(threshold) = &self.threshold {
            writeln!(f, "Threshold: {}", threshold)?;
        }
        if let Some(commitment) = &self.seal_hub_commitment {
            writeln!(f, "SealHub commitment: {}", commitment)?;
        }
        writeln!(f, "Nullifier: {}", self.nullifier)?;
        writeln!(f, "Attestor: {}", self.attestor)
    }
}

pub(crate) fn expect_len(input: &[FieldElement], expected: usize) -> SealCredResult<()> {
    if input.len() != expected {
        return Err(SealCredError::InvalidPublicInput(format!(
            "expected {} public inputs, got {}",
            expected,
            input.len()
        )));
    }
    Ok(())
}

/// Saturates at `u64::MAX` so an oversized discriminant still reads as an
/// unknown value rather than a shape error.
pub(crate) fn saturating_u64(element: &FieldElement) -> u64 {
    element.to_u64().unwrap_or(u64::MAX)
}

/// Reads one byte per field element.
pub(crate) fn packed_bytes(input: &[FieldElement]) -> SealCredResult<Vec<u8>> {
    input
        .iter()
        .enumerate()
        .map(|(i, element)| {
            element.to_byte().ok_or_else(|| {
                SealCredError::InvalidPublicInput(format!(
                    "byte slot {} holds {} which exceeds 255",
                    i, element
                ))
            })
        })
        .collect()
}

/// Reads a right-zero-padded string: everything before the first zero byte.
/// Non-zero bytes after the terminator are rejected so that no embedded null
/// can smuggle extra characters past a comparison.
pub(crate) fn padded_string(bytes: &[u8]) -> SealCredResult<String> {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    if bytes[end..].iter().any(|b| *b != 0) {
        return Err(SealCredError::InvalidPublicInput(
            "non-zero bytes after string terminator".into(),
        ));
    }
    String::from_utf8(bytes[..end].to_vec())
        .map_err(|e| SealCredError::InvalidPublicInput(format!("string is not utf-8: {}", e)))
}

/// Right-pads `text` into `width` byte slots.
pub fn encode_padded_string(text: &str, width: usize) -> SealCredResult<Vec<FieldElement>> {
    let bytes = text.as_bytes();
    if bytes.len() > width {
        return Err(SealCredError::InvalidPublicInput(format!(
            "{:?} does not fit in {} bytes",
            text, width
        )));
    }
    let mut out: Vec<FieldElement> = bytes.iter().map(|b| FieldElement::from_u64(*b as u64)).collect();
    out.resize(width, FieldElement::ZERO);
    Ok(out)
}
