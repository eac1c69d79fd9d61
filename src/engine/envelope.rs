//! Per-call decode state

use std::borrow::Cow;

use alloy_primitives::Bytes;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::DecodeError;
use crate::domain::abi::DecodedValue;
use crate::domain::spec::Specification;

/// Pipeline position of an [`Envelope`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Initialized,
    Sliced,
    TargetExpanded,
    Resolved,
    Errored,
}

/// One named fragment of a decode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub name: String,
    /// Raw bytes behind the piece: the slice for sliced pieces, the value
    /// for `bytes` parameters, empty otherwise
    pub part: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded_part: Option<DecodedValue>,
}

impl Piece {
    /// Value that lands in the result map
    pub fn value(&self) -> DecodedValue {
        self.decoded_part
            .clone()
            .unwrap_or_else(|| DecodedValue::Bytes(self.part.clone()))
    }
}

/// Name to value map that keeps insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeResult(Vec<(String, DecodedValue)>);

impl DecodeResult {
    /// Insert or replace; a replaced key keeps its original position
    pub fn insert(&mut self, name: impl Into<String>, value: DecodedValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodedValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for DecodeResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// State threaded through the decode stages.
///
/// Each stage consumes an envelope and hands back the next one; once an
/// error is recorded the remaining stages are skipped.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<'a> {
    pub spec: Cow<'a, Specification>,
    pub input: Bytes,
    pub stage: Stage,
    pub pieces: Vec<Piece>,
    pub result: DecodeResult,
    #[serde(serialize_with = "serialize_error", skip_serializing_if = "Option::is_none")]
    pub error: Option<DecodeError>,
}

impl<'a> Envelope<'a> {
    pub fn new(spec: Cow<'a, Specification>, input: &[u8]) -> Self {
        Self {
            spec,
            input: Bytes::copy_from_slice(input),
            stage: Stage::Initialized,
            pieces: Vec::new(),
            result: DecodeResult::default(),
            error: None,
        }
    }

    /// Run `stage` unless a previous stage failed
    pub fn then(self, stage: impl FnOnce(Self) -> Self) -> Self {
        if self.is_errored() {
            self
        } else {
            stage(self)
        }
    }

    pub fn advance(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_pieces(mut self, pieces: impl IntoIterator<Item = Piece>) -> Self {
        self.pieces.extend(pieces);
        self
    }

    pub fn with_result(mut self, result: DecodeResult) -> Self {
        self.result = result;
        self
    }

    /// Move to [`Stage::Errored`]. Pieces stay for diagnostics; the result
    /// is cleared.
    pub fn fail(mut self, error: DecodeError) -> Self {
        tracing::debug!(
            spec = %self.spec.name,
            stage = ?self.stage,
            pieces = self.pieces.len(),
            "decode failed: {}",
            error.to_string().lines().next().unwrap_or_default()
        );
        self.stage = Stage::Errored;
        self.result = DecodeResult::default();
        self.error = Some(error);
        self
    }

    pub fn is_errored(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        self.stage == Stage::Resolved
    }

    /// The piece carrying `name`, if any
    pub fn piece(&self, name: &str) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.name == name)
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<DecodeError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    if let Some(error) = error {
        map.serialize_entry("message", &error.to_string())?;
    }
    map.end()
}
