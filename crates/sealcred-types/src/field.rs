use crate::address::EthAddress;
use crate::error::{SealCredError, SealCredResult};
use crate::{ETH_ADDRESS_SIZE, FIELD_ELEMENT_SIZE};
use num_bigint::{BigUint, ParseBigIntError};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A big-endian `uint256`, the unit of every public-input slot and proof
/// coordinate.
///
/// Serialized as a decimal string, which is what circuit tooling emits.
/// Deserialization also accepts `0x` hex strings and plain integers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FieldElement(pub [u8; FIELD_ELEMENT_SIZE]);

impl FieldElement {
    /// The zero word.
    pub const ZERO: Self = Self([0u8; FIELD_ELEMENT_SIZE]);

    /// Wraps big-endian bytes.
    pub fn from_be_bytes(bytes: [u8; FIELD_ELEMENT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Big-endian bytes.
    pub fn to_be_bytes(&self) -> [u8; FIELD_ELEMENT_SIZE] {
        self.0
    }

    /// Widens a `u64`.
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; FIELD_ELEMENT_SIZE];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Left-pads an address into a word, as `uint256(uint160(addr))` does.
    pub fn from_address(address: &EthAddress) -> Self {
        let mut bytes = [0u8; FIELD_ELEMENT_SIZE];
        bytes[12..].copy_from_slice(address.as_bytes());
        Self(bytes)
    }

    /// Narrows to `u64` when the value fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0[..24].iter().any(|b| *b != 0) {
            return None;
        }
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.0[24..]);
        Some(u64::from_be_bytes(word))
    }

    /// Narrows to a single byte when the value fits.
    pub fn to_byte(&self) -> Option<u8> {
        if self.0[..31].iter().any(|b| *b != 0) {
            return None;
        }
        Some(self.0[31])
    }

    /// Narrows to an address when the upper 96 bits are clear.
    pub fn to_address(&self) -> Option<EthAddress> {
        if self.0[..12].iter().any(|b| *b != 0) {
            return None;
        }
        let mut bytes = [0u8; ETH_ADDRESS_SIZE];
        bytes.copy_from_slice(&self.0[12..]);
        Some(EthAddress(bytes))
    }

    /// Whether the word is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// `0x`-prefixed, zero-padded hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parses `0x` hex of at most 64 digits.
    pub fn from_hex(s: &str) -> SealCredResult<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() || digits.len() > FIELD_ELEMENT_SIZE * 2 {
            return Err(SealCredError::Serialization(format!(
                "Invalid uint256 hex length: {}",
                digits.len()
            )));
        }
        let padded = format!("{:0>64}", digits);
        let bytes =
            hex::decode(padded).map_err(|e| SealCredError::Serialization(e.to_string()))?;
        let mut arr = [0u8; FIELD_ELEMENT_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Parses a base-10 string, rejecting values above `2^256 - 1`.
    pub fn from_dec_str(s: &str) -> SealCredResult<Self> {
        if s.is_empty() {
            return Err(SealCredError::Serialization("Empty uint256 string".into()));
        }
        if let Some(c) = s.chars().find(|c| !c.is_ascii_digit()) {
            return Err(SealCredError::Serialization(format!(
                "Invalid decimal digit: {:?}",
                c
            )));
        }
        let value: BigUint = s
            .parse()
            .map_err(|e: ParseBigIntError| SealCredError::Serialization(e.to_string()))?;
        let digits = value.to_bytes_be();
        if digits.len() > FIELD_ELEMENT_SIZE {
            return Err(SealCredError::Serialization("uint256 overflow".into()));
        }
        let mut bytes = [0u8; FIELD_ELEMENT_SIZE];
        bytes[FIELD_ELEMENT_SIZE - digits.len()..].copy_from_slice(&digits);
        Ok(Self(bytes))
    }

    /// Base-10 rendering.
    pub fn to_dec_string(&self) -> String {
        BigUint::from_bytes_be(&self.0).to_str_radix(10)
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl FromStr for FieldElement {
    type Err = SealCredError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") {
            Self::from_hex(s)
        } else {
            Self::from_dec_str(s)
        }
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_dec_string())
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dec_string())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_dec_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

struct FieldElementVisitor;

impl<'de> Visitor<'de> for FieldElementVisitor {
    type Value = FieldElement;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a uint256 as a decimal string, 0x hex string or integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(FieldElement::from_u64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(FieldElementVisitor)
        } else {
            <[u8; FIELD_ELEMENT_SIZE]>::deserialize(deserializer).map(FieldElement)
        }
    }
}

/// Chain identity embedded in balance proofs and attestation messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Goerli testnet, encoded as ASCII `g`.
    #[default]
    Goerli,
    /// Ethereum mainnet, encoded as ASCII `m`.
    Mainnet,
}

impl Network {
    /// The one-byte code circuits and attestors use for this network.
    pub fn code(&self) -> u8 {
        match self {
            Network::Goerli => b'g',
            Network::Mainnet => b'm',
        }
    }

    /// Inverse of [`Network::code`].
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            c if c == b'g' as u64 => Some(Network::Goerli),
            c if c == b'm' as u64 => Some(Network::Mainnet),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Goerli => write!(f, "goerli"),
            Network::Mainnet => write!(f, "mainnet"),
        }
    }
}

impl FromStr for Network {
    type Err = SealCredError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "goerli" | "g" => Ok(Network::Goerli),
            "mainnet" | "m" => Ok(Network::Mainnet),
            other => Err(SealCredError::Config(format!("Unknown network: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_field_element_decimal() {
        let key = "13578469780849928704623562188688413596472689853032556827882124682666588837591";
        let fe = FieldElement::from_dec_str(key).unwrap();
        assert_eq!(fe.to_dec_string(), key);
        assert_eq!(FieldElement::ZERO.to_dec_string(), "0");
        assert_eq!(FieldElement::from_u64(123).to_dec_string(), "123");
    }

    #[test]
    fn test_field_element_overflow_rejected() {
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(FieldElement::from_dec_str(too_big).is_err());
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        assert_eq!(FieldElement::from_dec_str(max).unwrap().0, [0xff; 32]);
    }

    #[test]
    fn test_field_element_narrowing() {
        let addr = EthAddress::from_hex("0x0000000000000000000000000000000000000001").unwrap();
        let fe = FieldElement::from_address(&addr);
        assert_eq!(fe.to_address(), Some(addr));
        assert_eq!(fe.to_u64(), Some(1));
        assert_eq!(fe.to_byte(), Some(1));
        assert_eq!(FieldElement::from_u64(256).to_byte(), None);

        let mut wide = [0u8; 32];
        wide[0] = 1;
        assert_eq!(FieldElement(wide).to_address(), None);
    }

    #[test]
    fn test_field_element_serde_forms() {
        let from_str: FieldElement = serde_json::from_str("\"123\"").unwrap();
        let from_hex: FieldElement = serde_json::from_str("\"0x7b\"").unwrap();
        let from_int: FieldElement = serde_json::from_str("123").unwrap();
        assert_eq!(from_str, from_hex);
        assert_eq!(from_str, from_int);
        assert_eq!(serde_json::to_string(&from_str).unwrap(), "\"123\"");
    }

    #[test]
    fn test_field_element_rejects_non_digits() {
        for input in ["+1", "1_000", " 1", "-0", "12a"] {
            assert!(
                matches!(
                    FieldElement::from_dec_str(input),
                    Err(SealCredError::Serialization(_))
                ),
                "{input:?} should be rejected"
            );
        }
        assert!(FieldElement::from_dec_str("").is_err());
        assert_eq!(
            FieldElement::from_dec_str("000123").unwrap(),
            FieldElement::from_u64(123)
        );
    }

    #[test]
    fn test_network_codes() {
        assert_eq!(Network::Goerli.code(), 103);
        assert_eq!(Network::Mainnet.code(), 109);
        assert_eq!(Network::from_code(103), Some(Network::Goerli));
        assert_eq!(Network::from_code(1), None);
        assert_eq!("m".parse::<Network>().unwrap(), Network::Mainnet);
    }

    proptest! {
        #[test]
        fn prop_decimal_roundtrip(bytes in proptest::array::uniform32(any::<u8>())) {
            let fe = FieldElement(bytes);
            prop_assert_eq!(FieldElement::from_dec_str(&fe.to_dec_string()).unwrap(), fe);
        }
    }
}
