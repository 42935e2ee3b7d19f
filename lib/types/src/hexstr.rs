// ============ Hex Boundary Helpers ============
// Hex strings are lowercase and 0x-prefixed at the boundary only.

use crate::error::{DecodeError, Result};

pub fn encode_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decodes a hex string, with or without the `0x` prefix.
pub fn decode_prefixed(s: &str) -> Result<Vec<u8>> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(stripped)?)
}

pub fn decode_hash(s: &str) -> Result<[u8; 32]> {
    let bytes = decode_prefixed(s)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| DecodeError::Truncated { expected: 32, actual: bytes.len() })
}

/// `#[serde(with = "crate::hexstr::fixed")]` for `[u8; 32]` fields.
pub mod fixed {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::encode_prefixed(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(d)?;
        super::decode_hash(&s).map_err(D::Error::custom)
    }
}

pub mod option_fixed {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<[u8; 32]>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(hash) => s.serialize_some(&super::encode_prefixed(hash)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<[u8; 32]>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|s| super::decode_hash(&s).map_err(D::Error::custom))
            .transpose()
    }
}

pub mod bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::encode_prefixed(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        super::decode_prefixed(&s).map_err(D::Error::custom)
    }
}

/// Balances travel as decimal strings so 128-bit values survive JSON consumers.
pub mod u128_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(D::Error::custom)
    }
}
