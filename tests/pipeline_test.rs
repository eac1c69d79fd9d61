//! End-to-end decoding through the public API
//!
//! Payloads are built with alloy-sol-types so the bytes match what the
//! portals and contracts actually emit.

use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::SolValue;
use serde_json::json;

use specdec::system::{erc1155_batch_deposit, ether_deposit};
use specdec::{decode, decode_value, DecodeError, DecodedValue, Specification, Stage};

const TOKEN: Address = address!("2960f4db2b0993ae5b59bc4a0f5ec7a1767e905e");
const FROM: Address = address!("a074683b5be015f053b5dceb064c41fc9d11b6e5");

fn spec(value: serde_json::Value) -> Specification {
    Specification::from_value(value).unwrap()
}

fn uint_word(value: u64) -> Vec<u8> {
    U256::from(value).to_be_bytes::<32>().to_vec()
}

#[test]
fn test_slice_decode_single_deposit() {
    let spec = spec(json!({
        "name": "ERC-1155 single deposit",
        "timestamp": 0,
        "version": 1,
        "mode": "abi_params",
        "abiParams": [],
        "sliceInstructions": [
            {"from": 0, "to": 20, "name": "tokenAddress"},
            {"from": 20, "to": 40, "name": "from"},
            {"from": 40, "to": 72, "name": "tokenId", "type": "uint"},
            {"from": 72, "to": 104, "name": "amount", "type": "uint"}
        ]
    }));

    let mut payload = TOKEN.to_vec();
    payload.extend_from_slice(FROM.as_slice());
    payload.extend(uint_word(2));
    payload.extend(uint_word(100));

    let envelope = decode(&spec, &payload);
    assert_eq!(envelope.stage, Stage::Resolved);
    assert!(envelope.error.is_none());

    let result = &envelope.result;
    assert_eq!(
        result.keys().collect::<Vec<_>>(),
        vec!["tokenAddress", "from", "tokenId", "amount"]
    );
    assert_eq!(
        result.get("tokenAddress").unwrap().to_string(),
        "0x2960f4db2b0993ae5b59bc4a0f5ec7a1767e905e"
    );
    assert_eq!(
        result.get("from").unwrap().to_string(),
        "0xa074683b5be015f053b5dceb064c41fc9d11b6e5"
    );
    assert_eq!(result.get("tokenId"), Some(&DecodedValue::uint(2)));
    assert_eq!(result.get("amount"), Some(&DecodedValue::uint(100)));

    println!("✓ slice decode resolved {} fields", result.len());
}

#[test]
fn test_slice_target_is_unwrapped() {
    let spec = erc1155_batch_deposit();

    let layers = (
        vec![U256::from(1), U256::from(2)],
        vec![U256::from(10), U256::from(20)],
        Bytes::from_static(&[0xde, 0xad]),
        Bytes::new(),
    )
        .abi_encode_params();
    let mut payload = TOKEN.to_vec();
    payload.extend_from_slice(FROM.as_slice());
    payload.extend(layers);

    let envelope = decode(&spec, &payload);
    assert!(envelope.error.is_none(), "{:?}", envelope.error);
    assert!(envelope.is_resolved());

    let result = &envelope.result;
    for key in ["tokenAddress", "from", "tokenIds", "amount", "baseLayer", "execLayer"] {
        assert!(result.contains_key(key), "missing {key}");
    }
    assert!(!result.contains_key("data"));
    assert_eq!(
        result.get("tokenIds"),
        Some(&DecodedValue::Array(vec![
            DecodedValue::uint(1),
            DecodedValue::uint(2)
        ]))
    );
    assert_eq!(result.get("baseLayer").unwrap().to_string(), "0xdead");
    assert_eq!(result.get("execLayer").unwrap().to_string(), "0x");

    // the raw target slice stays on the envelope
    assert!(envelope.piece("data").is_some());
}

#[test]
fn test_slice_target_failure_names_target() {
    let spec = erc1155_batch_deposit();
    let mut payload = TOKEN.to_vec();
    payload.extend_from_slice(FROM.as_slice());
    payload.extend_from_slice(&[0u8; 10]);

    let envelope = decode(&spec, &payload);
    assert_eq!(envelope.stage, Stage::Errored);
    assert!(envelope.result.is_empty());

    let message = envelope.error.as_ref().unwrap().to_string();
    assert!(message.contains("slice target \"data\""));
    assert!(message.contains("Data size of 10 bytes is too small"));
}

#[test]
fn test_unknown_selector_on_json_abi() {
    let spec = spec(json!({
        "name": "ERC-20",
        "timestamp": 0,
        "version": 1,
        "mode": "json_abi",
        "abi": [{
            "type": "function",
            "name": "transfer",
            "stateMutability": "nonpayable",
            "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
            "outputs": [{"name": "", "type": "bool"}]
        }]
    }));

    let mut payload = vec![0x24, 0xd1, 0x5c, 0x67];
    payload.extend(uint_word(1));

    let envelope = decode(&spec, &payload);
    assert_eq!(envelope.stage, Stage::Errored);
    assert!(envelope
        .error
        .as_ref()
        .unwrap()
        .to_string()
        .starts_with("Encoded function signature \"0x24d15c67\" not found on ABI."));
}

#[test]
fn test_json_abi_call_decodes() {
    let spec = spec(json!({
        "name": "ERC-20",
        "mode": "json_abi",
        "abi": [{
            "type": "function",
            "name": "transfer",
            "stateMutability": "nonpayable",
            "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
            "outputs": [{"name": "", "type": "bool"}]
        }]
    }));

    let mut payload = hex::decode("a9059cbb").unwrap();
    payload.extend((FROM, U256::from(1000)).abi_encode_params());

    let envelope = decode(&spec, &payload);
    assert!(envelope.is_resolved());

    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["result"]["functionName"], "transfer");
    assert_eq!(json["result"]["args"][1], "1000");
    assert_eq!(json["result"]["orderedNamedArgs"][0][0], "to");
    assert_eq!(json["result"]["orderedNamedArgs"][1][1], "1000");
}

#[test]
fn test_unsupported_mode() {
    let err = decode_value(json!({"name": "x", "mode": "random"}), &[0x01]).unwrap_err();
    assert_eq!(
        err,
        DecodeError::ModeNotSupported {
            mode: "random".into()
        }
    );
    assert_eq!(
        err.to_string(),
        "Mode \"random\" is not supported.\nSupported modes: abi_params, json_abi."
    );
}

#[test]
fn test_decoding_twice_gives_the_same_envelope() {
    let spec = ether_deposit();
    let mut payload = FROM.to_vec();
    payload.extend(uint_word(5));
    payload.extend_from_slice(b"hi");

    let first = serde_json::to_value(decode(&spec, &payload)).unwrap();
    let second = serde_json::to_value(decode(&spec, &payload)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first["result"]["execLayerData"], "0x6869");
}

#[test]
fn test_optional_trailing_slice_may_be_missing() {
    let spec = ether_deposit();
    let mut payload = FROM.to_vec();
    payload.extend(uint_word(5));

    let envelope = decode(&spec, &payload);
    assert!(envelope.error.is_none(), "{:?}", envelope.error);
    assert_eq!(
        envelope.result.get("execLayerData"),
        Some(&DecodedValue::Bytes(Bytes::new()))
    );
    assert_eq!(envelope.result.get("amount"), Some(&DecodedValue::uint(5)));
}

#[test]
fn test_out_of_bounds_slice_reports_offset() {
    let spec = spec(json!({
        "name": "short",
        "mode": "abi_params",
        "sliceInstructions": [{"from": 0, "to": 40, "name": "whole"}]
    }));

    let envelope = decode(&spec, &[0u8; 20]);
    assert_eq!(
        envelope.error.unwrap().to_string(),
        "Slice ending at offset \"40\" is out-of-bounds (size: 20)."
    );
}

#[test]
fn test_oversized_fixed_array_fails_on_envelope() {
    for declaration in [
        "uint256[576460752303423488] xs",
        "uint256[4294967296][4294967296] xs",
    ] {
        let spec = spec(json!({
            "name": "huge",
            "mode": "abi_params",
            "abiParams": [declaration]
        }));

        let envelope = decode(&spec, &[0u8; 64]);
        assert_eq!(envelope.stage, Stage::Errored, "{declaration}");
        assert!(matches!(
            envelope.error,
            Some(DecodeError::AbiSizeMismatch { size: 64, .. })
        ));
    }
}

#[test]
fn test_malformed_declaration_fails_on_envelope() {
    let spec = spec(json!({
        "name": "malformed",
        "mode": "abi_params",
        "abiParams": ["uint256 a b"]
    }));

    let envelope = decode(&spec, &uint_word(1));
    assert_eq!(envelope.stage, Stage::Errored);
    assert!(envelope.result.is_empty());

    let err = envelope.error.unwrap();
    assert!(matches!(err, DecodeError::AbiParse { .. }));
    assert!(err.to_string().contains("uint256 a b"));
}

#[test]
fn test_named_slice_type_renames_piece() {
    let spec = spec(json!({
        "name": "named type",
        "mode": "abi_params",
        "sliceInstructions": [
            {"from": 0, "to": 32, "name": "value", "type": "uint256 amount"}
        ]
    }));

    let envelope = decode(&spec, &uint_word(42));
    assert!(envelope.is_resolved());
    assert_eq!(envelope.result.get("amount"), Some(&DecodedValue::uint(42)));
    assert!(!envelope.result.contains_key("value"));
}
