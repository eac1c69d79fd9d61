//! ABI domain models and contracts
//!
//! This module defines the traits and types for ABI decoding,
//! independent of the underlying implementation (alloy-dyn-abi).

mod decoder;
mod value;

pub use decoder::{AbiDecoder, AbiParam, DecodedCall};
pub use value::DecodedValue;
