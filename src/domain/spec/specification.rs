//! Specification data model

use alloy_json_abi::JsonAbi;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Predicate;
use crate::engine::DecodeError;

/// Mode discriminators accepted on the wire, in display order.
pub const SUPPORTED_MODES: [&str; 2] = ["abi_params", "json_abi"];

/// A user-authored recipe for decoding a payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    /// Assigned by whoever stores the specification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Milliseconds since the unix epoch
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub version: u32,
    #[serde(flatten)]
    pub mode: SpecMode,
    /// Predicates OR'd together by the matcher. Absent or empty means the
    /// specification is never selected automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditionals: Option<Vec<Predicate>>,
}

/// Decoding strategy, tagged by the `mode` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum SpecMode {
    #[serde(rename = "abi_params")]
    AbiParams(AbiParamsMode),
    #[serde(rename = "json_abi")]
    JsonAbi(JsonAbiMode),
}

/// Human-readable ABI parameters, optionally applied to a named slice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiParamsMode {
    /// Parameter groups such as `"uint256 amount, address to"` or
    /// `"struct Foo { uint a; }"`
    #[serde(default)]
    pub abi_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice_instructions: Option<Vec<SliceInstruction>>,
    /// Name of the slice whose bytes are decoded again with `abi_params`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice_target: Option<String>,
}

/// Full contract ABI; the payload is treated as calldata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonAbiMode {
    pub abi: JsonAbi,
}

/// One byte range of the payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceInstruction {
    /// Inclusive start offset
    pub from: usize,
    /// Exclusive end offset; absent means the end of the payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// ABI type to decode the slice as; absent leaves the raw bytes
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

impl SliceInstruction {
    pub fn is_optional(&self) -> bool {
        self.optional.unwrap_or(false)
    }

    /// Result key for this slice: its declared name, else `param{index}`
    pub fn piece_name(&self, index: usize) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("param{index}"),
        }
    }
}

impl Specification {
    /// Parse a loosely-typed specification, rejecting unknown modes before
    /// anything else is looked at.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DecodeError> {
        let mode = match value.get("mode") {
            Some(serde_json::Value::String(mode)) => mode.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        if !SUPPORTED_MODES.contains(&mode.as_str()) {
            return Err(DecodeError::ModeNotSupported { mode });
        }

        serde_json::from_value(value).map_err(|err| DecodeError::InvalidSpecification {
            reason: err.to_string(),
        })
    }

    /// The wire name of this specification's mode
    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            SpecMode::AbiParams(_) => SUPPORTED_MODES[0],
            SpecMode::JsonAbi(_) => SUPPORTED_MODES[1],
        }
    }

    /// Whether the matcher may pick this specification on its own
    pub fn has_conditionals(&self) -> bool {
        self.conditionals
            .as_ref()
            .is_some_and(|predicates| !predicates.is_empty())
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }
}
