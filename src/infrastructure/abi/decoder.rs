//! ABI decoder implementation using alloy-dyn-abi

use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_json_abi::{JsonAbi, Param};
use alloy_primitives::Bytes;

use super::params::parse_declarations;
use crate::domain::abi::{AbiDecoder, AbiParam, DecodedCall, DecodedValue};
use crate::engine::DecodeError;

const SELECTOR_LEN: usize = 4;

/// ABI decoder implementation using alloy-dyn-abi
#[derive(Debug, Default, Clone, Copy)]
pub struct AlloyAbiDecoder;

impl AbiDecoder for AlloyAbiDecoder {
    fn parse_params(&self, declarations: &[String]) -> Result<Vec<AbiParam>, DecodeError> {
        parse_declarations(declarations)
    }

    fn decode_params(
        &self,
        params: &[AbiParam],
        data: &[u8],
    ) -> Result<Vec<DecodedValue>, DecodeError> {
        if params.is_empty() {
            return Ok(Vec::new());
        }

        // an overflowing head can never fit in the data
        let head_size = params.iter().try_fold(0usize, |total, param| {
            head_words(&param.ty)?
                .checked_mul(32)
                .and_then(|bytes| total.checked_add(bytes))
        });
        if head_size.is_none_or(|head_size| data.len() < head_size) {
            return Err(DecodeError::AbiSizeMismatch {
                params: describe_params(params),
                data: format!("0x{}", hex::encode(data)),
                size: data.len(),
            });
        }

        // Create a tuple type for decoding all parameters
        let tuple_type = DynSolType::Tuple(params.iter().map(|param| param.ty.clone()).collect());
        let decoded = tuple_type
            .abi_decode_params(data)
            .map_err(|err| DecodeError::AbiDecode {
                params: describe_params(params),
                size: data.len(),
                reason: err.to_string(),
            })?;

        // Extract individual values from the tuple
        let values = match decoded {
            DynSolValue::Tuple(values) => values,
            other => vec![other],
        };

        Ok(values
            .into_iter()
            .zip(params)
            .map(|(value, param)| to_decoded_value(value, &param.components))
            .collect())
    }

    fn decode_function_call(
        &self,
        abi: &JsonAbi,
        data: &[u8],
    ) -> Result<DecodedCall, DecodeError> {
        let selector = &data[..data.len().min(SELECTOR_LEN)];

        let function = abi
            .functions()
            .find(|function| function.selector().as_slice() == selector)
            .ok_or_else(|| DecodeError::FunctionSignatureNotFound {
                selector: format!("0x{}", hex::encode(selector)),
            })?;

        let params = function
            .inputs
            .iter()
            .map(param_from_json)
            .collect::<Result<Vec<_>, _>>()?;
        let args = self.decode_params(&params, &data[selector.len()..])?;

        let ordered_named_args = params
            .iter()
            .zip(&args)
            .enumerate()
            .map(|(idx, (param, value))| {
                let name = match param.declared_name() {
                    Some(name) => name.to_string(),
                    None if !param.kind.trim().is_empty() => param.kind.clone(),
                    None => format!("arg-{idx}"),
                };
                (name, value.clone())
            })
            .collect();

        Ok(DecodedCall {
            function_name: function.name.clone(),
            signature: function.signature(),
            args,
            ordered_named_args,
        })
    }
}

/// Resolve a JSON ABI input, keeping its declared type string as `kind`
fn param_from_json(param: &Param) -> Result<AbiParam, DecodeError> {
    let ty: DynSolType = param.resolve().map_err(|err| DecodeError::AbiParse {
        declaration: format!("{} {}", param.ty, param.name).trim().to_string(),
        reason: err.to_string(),
    })?;
    let components = param
        .components
        .iter()
        .map(param_from_json)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AbiParam {
        name: Some(param.name.clone()),
        kind: param.ty.clone(),
        ty,
        components,
    })
}

/// 32-byte words a type occupies in the head of an encoding, `None` when
/// the count does not fit in a `usize`
fn head_words(ty: &DynSolType) -> Option<usize> {
    if ty.is_dynamic() {
        return Some(1);
    }
    match ty {
        DynSolType::Tuple(types) => types
            .iter()
            .try_fold(0usize, |total, ty| total.checked_add(head_words(ty)?)),
        DynSolType::FixedArray(inner, size) => head_words(inner)?.checked_mul(*size),
        _ => Some(1),
    }
}

/// `uint256 amount, address` style listing for error messages
fn describe_params(params: &[AbiParam]) -> String {
    params
        .iter()
        .map(|param| match param.declared_name() {
            Some(name) => format!("{} {}", param.ty.sol_type_name(), name),
            None => param.ty.sol_type_name().into_owned(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert a DynSolValue, labelling tuples whose fields are all named
fn to_decoded_value(value: DynSolValue, components: &[AbiParam]) -> DecodedValue {
    match value {
        DynSolValue::Bool(b) => DecodedValue::Bool(b),
        DynSolValue::Int(i, _) => DecodedValue::Int(i),
        DynSolValue::Uint(u, _) => DecodedValue::Uint(u),
        DynSolValue::FixedBytes(word, size) => {
            DecodedValue::Bytes(Bytes::copy_from_slice(&word.as_slice()[..size.min(32)]))
        }
        DynSolValue::Address(addr) => DecodedValue::Address(addr),
        DynSolValue::Function(func) => DecodedValue::Bytes(Bytes::copy_from_slice(func.as_slice())),
        DynSolValue::Bytes(bytes) => DecodedValue::Bytes(bytes.into()),
        DynSolValue::String(s) => DecodedValue::String(s),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => DecodedValue::Array(
            items
                .into_iter()
                .map(|item| to_decoded_value(item, components))
                .collect(),
        ),
        DynSolValue::Tuple(fields) => {
            let named = components.len() == fields.len()
                && components.iter().all(|param| param.declared_name().is_some());
            if named {
                DecodedValue::Struct(
                    fields
                        .into_iter()
                        .zip(components)
                        .map(|(field, param)| {
                            let name = param.declared_name().unwrap_or_default().to_string();
                            (name, to_decoded_value(field, &param.components))
                        })
                        .collect(),
                )
            } else {
                DecodedValue::Tuple(
                    fields
                        .into_iter()
                        .enumerate()
                        .map(|(idx, field)| {
                            let nested = components
                                .get(idx)
                                .map(|param| param.components.as_slice())
                                .unwrap_or_default();
                            to_decoded_value(field, nested)
                        })
                        .collect(),
                )
            }
        }
        #[allow(unreachable_patterns)]
        other => DecodedValue::String(format!("{other:?}")),
    }
}
