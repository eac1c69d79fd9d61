//! Decode pipeline
//!
//! `abi_params`: Initialized -> Sliced -> TargetExpanded -> Resolved
//! `json_abi`:   Initialized -> Resolved
//!
//! Any stage may end in Errored instead, which skips the rest.

use std::borrow::Cow;

use alloy_primitives::Bytes;
use tracing::{debug, trace};

use super::{slice, DecodeError, DecodeResult, Envelope, Piece, Stage};
use crate::domain::abi::{AbiDecoder, DecodedValue};
use crate::domain::spec::{AbiParamsMode, JsonAbiMode, SliceInstruction, SpecMode, Specification};
use crate::infrastructure::abi::AlloyAbiDecoder;

/// Decode `payload` with `spec` using the alloy decoder.
///
/// Failures are stored on the returned envelope rather than returned.
pub fn decode<'a>(spec: &'a Specification, payload: &[u8]) -> Envelope<'a> {
    decode_with(&AlloyAbiDecoder, spec, payload)
}

/// Like [`decode`] but for a loosely-typed specification. An unknown mode is
/// the one failure reported as `Err`.
pub fn decode_value(
    spec: serde_json::Value,
    payload: &[u8],
) -> Result<Envelope<'static>, DecodeError> {
    let spec = Specification::from_value(spec)?;
    Ok(run(&AlloyAbiDecoder, Cow::Owned(spec), payload))
}

pub fn decode_with<'a>(
    decoder: &dyn AbiDecoder,
    spec: &'a Specification,
    payload: &[u8],
) -> Envelope<'a> {
    run(decoder, Cow::Borrowed(spec), payload)
}

/// Parse a `0x`-prefixed (or bare) hex payload
pub fn parse_payload(input: &str) -> Result<Bytes, DecodeError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|err| DecodeError::InvalidPayload {
            reason: err.to_string(),
        })
}

fn run<'a>(decoder: &dyn AbiDecoder, spec: Cow<'a, Specification>, payload: &[u8]) -> Envelope<'a> {
    debug!(
        spec = %spec.name,
        mode = spec.mode_name(),
        size = payload.len(),
        "decoding payload"
    );

    // stages borrow the mode while the envelope holds the spec
    let mode = spec.mode.clone();
    let envelope = Envelope::new(spec, payload);

    match &mode {
        SpecMode::AbiParams(mode) => envelope
            .then(|env| slice_stage(env, mode, decoder))
            .then(|env| expand_target_stage(env, mode, decoder))
            .then(|env| resolve_stage(env, mode)),
        SpecMode::JsonAbi(mode) => envelope.then(|env| function_stage(env, mode, decoder)),
    }
}

/// Slice the payload per instruction, or decode it whole when there are none
fn slice_stage<'a>(
    envelope: Envelope<'a>,
    mode: &AbiParamsMode,
    decoder: &dyn AbiDecoder,
) -> Envelope<'a> {
    let instructions = mode.slice_instructions.as_deref().unwrap_or_default();

    if instructions.is_empty() {
        return match decode_params_pieces(decoder, &mode.abi_params, &envelope.input) {
            Ok(pieces) => envelope.with_pieces(pieces).advance(Stage::Sliced),
            Err(err) => envelope.fail(err),
        };
    }

    let mut pieces = Vec::with_capacity(instructions.len());
    for (index, instruction) in instructions.iter().enumerate() {
        match slice_piece(decoder, &envelope.input, index, instruction) {
            Ok(piece) => pieces.push(piece),
            Err(err) => return envelope.with_pieces(pieces).fail(err),
        }
    }

    trace!(pieces = pieces.len(), "payload sliced");
    envelope.with_pieces(pieces).advance(Stage::Sliced)
}

/// Decode the slice named by `sliceTarget` with the declared parameters
fn expand_target_stage<'a>(
    envelope: Envelope<'a>,
    mode: &AbiParamsMode,
    decoder: &dyn AbiDecoder,
) -> Envelope<'a> {
    let Some(target) = mode.slice_target.as_deref() else {
        return envelope.advance(Stage::TargetExpanded);
    };

    let Some(data) = envelope.piece(target).map(|piece| piece.part.clone()) else {
        return envelope.fail(DecodeError::SliceTargetNotFound {
            target: target.to_string(),
        });
    };

    match decode_params_pieces(decoder, &mode.abi_params, &data) {
        Ok(pieces) => {
            trace!(slice_target = target, pieces = pieces.len(), "slice target expanded");
            envelope.with_pieces(pieces).advance(Stage::TargetExpanded)
        }
        Err(source) => envelope.fail(DecodeError::SliceTargetDecode {
            target: target.to_string(),
            abi_params: mode.abi_params.clone(),
            source: Box::new(source),
        }),
    }
}

/// Fold pieces into the result, leaving out the unwrapped slice target
fn resolve_stage<'a>(envelope: Envelope<'a>, mode: &AbiParamsMode) -> Envelope<'a> {
    let target = mode.slice_target.as_deref();

    let mut result = DecodeResult::default();
    for piece in &envelope.pieces {
        if Some(piece.name.as_str()) == target {
            continue;
        }
        result.insert(piece.name.clone(), piece.value());
    }

    envelope.with_result(result).advance(Stage::Resolved)
}

fn function_stage<'a>(
    envelope: Envelope<'a>,
    mode: &JsonAbiMode,
    decoder: &dyn AbiDecoder,
) -> Envelope<'a> {
    let call = match decoder.decode_function_call(&mode.abi, &envelope.input) {
        Ok(call) => call,
        Err(err) => return envelope.fail(err),
    };
    debug!(function = %call.signature, "function call decoded");

    let named = call
        .ordered_named_args
        .into_iter()
        .map(|(name, value)| DecodedValue::Tuple(vec![DecodedValue::String(name), value]))
        .collect();

    let mut result = DecodeResult::default();
    result.insert("functionName", DecodedValue::String(call.function_name));
    result.insert("args", DecodedValue::Array(call.args));
    result.insert("orderedNamedArgs", DecodedValue::Array(named));

    envelope.with_result(result).advance(Stage::Resolved)
}

fn slice_piece(
    decoder: &dyn AbiDecoder,
    payload: &[u8],
    index: usize,
    instruction: &SliceInstruction,
) -> Result<Piece, DecodeError> {
    let name = instruction.piece_name(index);

    let part = match slice(payload, instruction.from, instruction.to) {
        Ok(part) => Bytes::copy_from_slice(part),
        Err(err) if instruction.is_optional() => {
            debug!(slice = %name, "optional slice out of range, using empty bytes: {err}");
            return Ok(Piece {
                name,
                part: Bytes::new(),
                decoded_part: Some(DecodedValue::Bytes(Bytes::new())),
            });
        }
        Err(err) => return Err(err),
    };

    let kind = instruction
        .kind
        .as_deref()
        .map(str::trim)
        .filter(|kind| !kind.is_empty());
    let Some(kind) = kind else {
        return Ok(Piece {
            name,
            decoded_part: Some(DecodedValue::Bytes(part.clone())),
            part,
        });
    };

    let params = decoder.parse_params(&[kind.to_string()])?;
    if params.len() != 1 {
        return Err(DecodeError::AbiParse {
            declaration: kind.to_string(),
            reason: format!("expected a single type, found {} parameters", params.len()),
        });
    }
    let value = decoder.decode_params(&params, &part)?.into_iter().next();

    Ok(Piece {
        name: params[0].declared_name().map(str::to_string).unwrap_or(name),
        part,
        decoded_part: value,
    })
}

/// Decode `data` as a whole against the declarations, one piece per parameter
fn decode_params_pieces(
    decoder: &dyn AbiDecoder,
    declarations: &[String],
    data: &[u8],
) -> Result<Vec<Piece>, DecodeError> {
    let params = decoder.parse_params(declarations)?;
    let values = decoder.decode_params(&params, data)?;

    Ok(params
        .iter()
        .zip(values)
        .enumerate()
        .map(|(index, (param, value))| Piece {
            name: param
                .declared_name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("params{index}")),
            part: value.as_bytes().cloned().unwrap_or_default(),
            decoded_part: Some(value),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::spec::SliceInstruction;

    fn abi_params_spec(mode: AbiParamsMode) -> Specification {
        Specification {
            id: None,
            name: "test".into(),
            timestamp: 0,
            version: 1,
            mode: SpecMode::AbiParams(mode),
            conditionals: None,
        }
    }

    fn instruction(from: usize, to: Option<usize>, name: &str) -> SliceInstruction {
        SliceInstruction {
            from,
            to,
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_payload() {
        assert_eq!(parse_payload("0x0102").unwrap().as_ref(), &[1, 2]);
        assert_eq!(parse_payload("0102").unwrap().as_ref(), &[1, 2]);
        assert!(parse_payload("0x").unwrap().is_empty());
        assert!(matches!(
            parse_payload("0xzz"),
            Err(DecodeError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_untyped_slices_stay_raw() {
        let spec = abi_params_spec(AbiParamsMode {
            slice_instructions: Some(vec![
                instruction(0, Some(2), "head"),
                SliceInstruction {
                    from: 2,
                    ..Default::default()
                },
            ]),
            ..Default::default()
        });

        let envelope = decode(&spec, &[0xaa, 0xbb, 0xcc]);
        assert!(envelope.is_resolved());
        assert_eq!(envelope.result.get("head").unwrap().to_string(), "0xaabb");
        assert_eq!(envelope.result.get("param1").unwrap().to_string(), "0xcc");
    }

    #[test]
    fn test_optional_slice_degrades_to_empty_bytes() {
        let mut tail = instruction(10, None, "tail");
        tail.kind = Some("uint256".into());
        tail.optional = Some(true);
        let spec = abi_params_spec(AbiParamsMode {
            slice_instructions: Some(vec![instruction(0, Some(1), "head"), tail.clone()]),
            ..Default::default()
        });

        let envelope = decode(&spec, &[0x01]);
        assert!(envelope.error.is_none());
        assert_eq!(envelope.result.get("tail"), Some(&DecodedValue::bytes(Bytes::new())));

        tail.optional = Some(false);
        let spec = abi_params_spec(AbiParamsMode {
            slice_instructions: Some(vec![instruction(0, Some(1), "head"), tail]),
            ..Default::default()
        });
        let envelope = decode(&spec, &[0x01]);
        assert_eq!(envelope.stage, Stage::Errored);
        assert!(matches!(envelope.error, Some(DecodeError::SliceBounds { .. })));
        // the piece decoded before the failure is kept for diagnostics
        assert_eq!(envelope.pieces.len(), 1);
    }

    #[test]
    fn test_missing_slice_target() {
        let spec = abi_params_spec(AbiParamsMode {
            abi_params: vec!["uint256 a".into()],
            slice_instructions: Some(vec![instruction(0, None, "body")]),
            slice_target: Some("data".into()),
        });

        let envelope = decode(&spec, &[0u8; 32]);
        assert_eq!(
            envelope.error,
            Some(DecodeError::SliceTargetNotFound {
                target: "data".into()
            })
        );
    }

    #[test]
    fn test_unnamed_params_get_positional_names() {
        let spec = abi_params_spec(AbiParamsMode {
            abi_params: vec!["uint256, bool".into()],
            ..Default::default()
        });
        let mut payload = vec![0u8; 64];
        payload[31] = 7;
        payload[63] = 1;

        let envelope = decode(&spec, &payload);
        assert_eq!(envelope.result.get("params0"), Some(&DecodedValue::uint(7)));
        assert_eq!(envelope.result.get("params1"), Some(&DecodedValue::Bool(true)));
    }

    #[test]
    fn test_spec_is_not_mutated() {
        let spec = abi_params_spec(AbiParamsMode {
            abi_params: vec!["uint256 a".into()],
            ..Default::default()
        });
        let before = spec.clone();
        let _ = decode(&spec, &[0u8; 32]);
        assert_eq!(spec, before);
    }
}
