//! Hex-encoded byte strings.
//!
//! Binary fields in the keystore document (salts, IVs, ciphertext, digests)
//! travel as JSON strings of lowercase hex. Writing always produces bare
//! lowercase hex; reading additionally accepts a `0x`/`0X` prefix so that
//! documents from prefix-style writers stay readable. The empty byte string
//! encodes to `""`.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::KeystoreError;

/// Byte string with a hex wire representation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Hex(Vec<u8>);

impl Hex {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Hex {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Hex {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Hex {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Hex {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hex({})", hex::encode(&self.0))
    }
}

impl FromStr for Hex {
    type Err = KeystoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        Ok(Self(hex::decode(digits)?))
    }
}

impl Serialize for Hex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Hex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_bare_lowercase() {
        let h = Hex::from([0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(h.to_string(), "deadbeef");
    }

    #[test]
    fn empty_encodes_to_empty_string() {
        assert_eq!(Hex::default().to_string(), "");
    }

    #[test]
    fn parses_bare_hex() {
        let h: Hex = "00ff10".parse().unwrap();
        assert_eq!(h.as_bytes(), &[0x00, 0xff, 0x10]);
    }

    #[test]
    fn parses_prefixed_hex() {
        let lower: Hex = "0xdeadbeef".parse().unwrap();
        let upper: Hex = "0XDEADBEEF".parse().unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn parses_empty_string() {
        let h: Hex = "".parse().unwrap();
        assert!(h.is_empty());
    }

    #[test]
    fn rejects_odd_length() {
        assert!("abc".parse::<Hex>().is_err());
    }

    #[test]
    fn rejects_non_hex_digits() {
        assert!("zzzz".parse::<Hex>().is_err());
        // the prefix is stripped once, not repeatedly
        assert!("0x0xab".parse::<Hex>().is_err());
    }

    #[test]
    fn roundtrips_through_json() {
        let h = Hex::from(vec![1, 2, 3]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, "\"010203\"");

        let back: Hex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn deserializes_prefixed_json() {
        let h: Hex = serde_json::from_str("\"0x0102\"").unwrap();
        assert_eq!(h.as_bytes(), &[1, 2]);
    }

    #[test]
    fn json_rejects_bad_hex() {
        assert!(serde_json::from_str::<Hex>("\"xy\"").is_err());
    }
}
