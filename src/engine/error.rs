//! Decode error taxonomy
//!
//! Messages are multi-line and meant to be shown to a user as they are.

use std::fmt;

use thiserror::Error;

use crate::domain::spec::SUPPORTED_MODES;

/// Which end of a slice fell outside the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceEdge {
    Start,
    End,
}

impl fmt::Display for SliceEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceEdge::Start => f.write_str("starting"),
            SliceEdge::End => f.write_str("ending"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Raised before any stage runs; never stored on an envelope
    #[error("Mode \"{mode}\" is not supported.\nSupported modes: {supported}.", supported = SUPPORTED_MODES.join(", "))]
    ModeNotSupported { mode: String },

    #[error("Invalid specification.\n\nDetails: {reason}")]
    InvalidSpecification { reason: String },

    #[error("Invalid payload. Expected 0x-prefixed hex.\n\nDetails: {reason}")]
    InvalidPayload { reason: String },

    #[error("Slice {edge} at offset \"{offset}\" is out-of-bounds (size: {size}).")]
    SliceBounds {
        edge: SliceEdge,
        offset: usize,
        size: usize,
    },

    #[error("Invalid ABI parameter.\n\nDeclaration: {declaration}\nDetails: {reason}")]
    AbiParse { declaration: String, reason: String },

    #[error("Data size of {size} bytes is too small for given parameters.\n\nParams: ({params})\nData:   {data} ({size} bytes)")]
    AbiSizeMismatch {
        params: String,
        data: String,
        size: usize,
    },

    #[error("Failed to decode data with the given parameters.\n\nParams: ({params})\nData size: {size} bytes\nDetails: {reason}")]
    AbiDecode {
        params: String,
        size: usize,
        reason: String,
    },

    #[error("Encoded function signature \"{selector}\" not found on ABI.\nMake sure you are using the correct ABI and that the function exists on it.\nYou can look up the signature here: https://openchain.xyz/signatures?query={selector}.")]
    FunctionSignatureNotFound { selector: String },

    #[error("Slice target \"{target}\" does not match the name of any slice instruction.")]
    SliceTargetNotFound { target: String },

    #[error("Failed to decode the slice target \"{target}\" with the ABI parameters.\nEither \"{target}\" selects the wrong bytes or the ABI parameters do not describe them.\n\nABI Params: {}\nCause: {source}", format_declarations(.abi_params))]
    SliceTargetDecode {
        target: String,
        abi_params: Vec<String>,
        source: Box<DecodeError>,
    },
}

fn format_declarations(declarations: &[String]) -> String {
    let quoted: Vec<String> = declarations
        .iter()
        .map(|declaration| format!("\"{declaration}\""))
        .collect();
    format!("[{}]", quoted.join(", "))
}
