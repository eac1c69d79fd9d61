//! Decoded values as they leave the engine

use std::fmt;

use alloy_primitives::{Address, Bytes, I256, U256};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A decoded ABI value
///
/// Serializes integers as decimal strings so no precision is lost on the way
/// to JSON consumers, addresses in checksum form and bytes as `0x` hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    Bool(bool),
    Int(I256),
    Uint(U256),
    Address(Address),
    Bytes(Bytes),
    String(String),
    Array(Vec<DecodedValue>),
    /// Tuple with unnamed fields
    Tuple(Vec<DecodedValue>),
    /// Tuple whose fields are all named
    Struct(Vec<(String, DecodedValue)>),
}

impl DecodedValue {
    pub fn uint(value: u64) -> Self {
        Self::Uint(U256::from(value))
    }

    pub fn bytes(value: impl Into<Bytes>) -> Self {
        Self::Bytes(value.into())
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Field of a struct value by name
    pub fn field(&self, name: &str) -> Option<&DecodedValue> {
        match self {
            Self::Struct(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedValue::Bool(b) => serializer.serialize_bool(*b),
            DecodedValue::Int(i) => serializer.serialize_str(&i.to_string()),
            DecodedValue::Uint(u) => serializer.serialize_str(&u.to_string()),
            DecodedValue::Address(addr) => serializer.serialize_str(&addr.to_checksum(None)),
            DecodedValue::Bytes(bytes) => {
                serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
            }
            DecodedValue::String(s) => serializer.serialize_str(s),
            DecodedValue::Array(items) | DecodedValue::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DecodedValue::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Bool(b) => write!(f, "{b}"),
            DecodedValue::Int(i) => write!(f, "{i}"),
            DecodedValue::Uint(u) => write!(f, "{u}"),
            DecodedValue::Address(addr) => f.write_str(&addr.to_checksum(None)),
            DecodedValue::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            DecodedValue::String(s) => f.write_str(s),
            composite => {
                let json = serde_json::to_string(composite).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}
