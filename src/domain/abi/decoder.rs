//! ABI decoder trait and types

use alloy_dyn_abi::DynSolType;
use alloy_json_abi::JsonAbi;

use super::DecodedValue;
use crate::engine::DecodeError;

/// A resolved ABI parameter
#[derive(Debug, Clone, PartialEq)]
pub struct AbiParam {
    /// Declared name, if any
    pub name: Option<String>,
    /// Canonical Solidity type (e.g. "uint256", "(uint256,address)[]")
    pub kind: String,
    pub ty: DynSolType,
    /// Fields of the innermost tuple, used to label struct values
    pub components: Vec<AbiParam>,
}

impl AbiParam {
    /// Declared name, ignoring blanks
    pub fn declared_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Result of decoding a function call against a JSON ABI
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCall {
    /// Function name
    pub function_name: String,
    /// Full function signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Positional argument values
    pub args: Vec<DecodedValue>,
    /// `(name, value)` in declaration order
    pub ordered_named_args: Vec<(String, DecodedValue)>,
}

/// Trait for ABI decoding implementations
///
/// This trait abstracts over the actual ABI decoding implementation,
/// allowing us to swap out alloy-dyn-abi for a different library if needed.
pub trait AbiDecoder: Send + Sync {
    /// Parse human-readable parameter declarations
    ///
    /// Each entry may hold several comma separated parameters and any number
    /// of `struct Name { ... }` definitions referenced by the others.
    fn parse_params(&self, declarations: &[String]) -> Result<Vec<AbiParam>, DecodeError>;

    /// Decode `data` as the ABI encoding of `params`, one value per parameter
    fn decode_params(
        &self,
        params: &[AbiParam],
        data: &[u8],
    ) -> Result<Vec<DecodedValue>, DecodeError>;

    /// Decode selector-prefixed calldata against a contract ABI
    ///
    /// # Returns
    /// * `Ok(DecodedCall)` - The decoded function call
    /// * `Err(DecodeError::FunctionSignatureNotFound)` - No function matches the selector
    /// * `Err(...)` - If decoding the arguments fails
    fn decode_function_call(&self, abi: &JsonAbi, data: &[u8])
        -> Result<DecodedCall, DecodeError>;
}
