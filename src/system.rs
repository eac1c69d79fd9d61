//! Built-in specifications for inputs sent through the rollups portals
//!
//! Each one is selected by the portal address in `msgSender`.

use crate::domain::spec::{
    AbiParamsMode, Condition, ConditionField, ConditionOperator, LogicalOperator, Predicate,
    SliceInstruction, SpecMode, Specification,
};

pub const ETHER_PORTAL: &str = "0xFfdbe43d4c855BF7e0f105c400A50857f53AB044";
pub const ERC20_PORTAL: &str = "0x9C21AEb2093C32DDbC53eEF24B873BDCd1aDa1DB";
pub const ERC721_PORTAL: &str = "0x237F8DD094C0e47f4236f12b4Fa01d6Dae89fb87";
pub const ERC1155_SINGLE_PORTAL: &str = "0x7CFB0193Ca87eB6e48056885E026552c3A941FC4";
pub const ERC1155_BATCH_PORTAL: &str = "0xedB53860A6B52bbb7561Ad596416ee9965B055Aa";
pub const DAPP_ADDRESS_RELAY: &str = "0xF5DE34d6BbC0446E2a45719E718efEbaaE179daE";

/// 2023-11-01T00:00:00Z
const SYSTEM_TIMESTAMP: u64 = 1_698_796_800_000;

/// Trailing `abi.encode(baseLayerData, execLayerData)` of NFT deposits
const LAYER_PARAMS: &str = "bytes baseLayer, bytes execLayer";

/// All system specifications, in matching order
pub fn system_specifications() -> Vec<Specification> {
    vec![
        ether_deposit(),
        erc20_deposit(),
        erc721_deposit(),
        erc1155_single_deposit(),
        erc1155_batch_deposit(),
        dapp_address_relay(),
    ]
}

/// Look a system specification up by id
pub fn system_specification(id: &str) -> Option<Specification> {
    system_specifications()
        .into_iter()
        .find(|spec| spec.id.as_deref() == Some(id))
}

pub fn ether_deposit() -> Specification {
    system_spec(
        "ether-deposit",
        "Ether Portal @cartesi/rollups@1.x",
        ETHER_PORTAL,
        AbiParamsMode {
            abi_params: Vec::new(),
            slice_instructions: Some(vec![
                raw(0, 20, "sender"),
                typed(20, 52, "amount", "uint"),
                rest(52, "execLayerData"),
            ]),
            slice_target: None,
        },
    )
}

pub fn erc20_deposit() -> Specification {
    system_spec(
        "erc20-deposit",
        "ERC-20 Portal @cartesi/rollups@1.x",
        ERC20_PORTAL,
        AbiParamsMode {
            abi_params: Vec::new(),
            slice_instructions: Some(vec![
                raw(0, 1, "success"),
                raw(1, 21, "tokenAddress"),
                raw(21, 41, "from"),
                typed(41, 73, "amount", "uint"),
                rest(73, "execLayerData"),
            ]),
            slice_target: None,
        },
    )
}

pub fn erc721_deposit() -> Specification {
    system_spec(
        "erc721-deposit",
        "ERC-721 Portal @cartesi/rollups@1.x",
        ERC721_PORTAL,
        AbiParamsMode {
            abi_params: vec![LAYER_PARAMS.to_string()],
            slice_instructions: Some(vec![
                raw(0, 20, "tokenAddress"),
                raw(20, 40, "from"),
                typed(40, 72, "tokenId", "uint"),
                tail(72, "data"),
            ]),
            slice_target: Some("data".to_string()),
        },
    )
}

pub fn erc1155_single_deposit() -> Specification {
    system_spec(
        "erc1155-single-deposit",
        "ERC-1155 Single Portal @cartesi/rollups@1.x",
        ERC1155_SINGLE_PORTAL,
        AbiParamsMode {
            abi_params: vec![LAYER_PARAMS.to_string()],
            slice_instructions: Some(vec![
                raw(0, 20, "tokenAddress"),
                raw(20, 40, "from"),
                typed(40, 72, "tokenId", "uint"),
                typed(72, 104, "amount", "uint"),
                tail(104, "data"),
            ]),
            slice_target: Some("data".to_string()),
        },
    )
}

pub fn erc1155_batch_deposit() -> Specification {
    system_spec(
        "erc1155-batch-deposit",
        "ERC-1155 Batch Portal @cartesi/rollups@1.x",
        ERC1155_BATCH_PORTAL,
        AbiParamsMode {
            abi_params: vec![
                "uint[] tokenIds, uint[] amount, bytes baseLayer, bytes execLayer".to_string(),
            ],
            slice_instructions: Some(vec![
                raw(0, 20, "tokenAddress"),
                raw(20, 40, "from"),
                tail(40, "data"),
            ]),
            slice_target: Some("data".to_string()),
        },
    )
}

pub fn dapp_address_relay() -> Specification {
    system_spec(
        "dapp-address-relay",
        "DApp Address Relay @cartesi/rollups@1.x",
        DAPP_ADDRESS_RELAY,
        AbiParamsMode {
            abi_params: Vec::new(),
            slice_instructions: Some(vec![raw(0, 20, "dappAddress")]),
            slice_target: None,
        },
    )
}

fn system_spec(id: &str, name: &str, sender: &str, mode: AbiParamsMode) -> Specification {
    Specification {
        id: Some(format!("system:{id}")),
        name: name.to_string(),
        timestamp: SYSTEM_TIMESTAMP,
        version: 1,
        mode: SpecMode::AbiParams(mode),
        conditionals: Some(vec![Predicate {
            logical_operator: LogicalOperator::Or,
            conditions: vec![Condition {
                field: ConditionField::MsgSender,
                operator: ConditionOperator::Equals,
                value: sender.to_string(),
            }],
        }]),
    }
}

fn raw(from: usize, to: usize, name: &str) -> SliceInstruction {
    SliceInstruction {
        from,
        to: Some(to),
        name: Some(name.to_string()),
        ..Default::default()
    }
}

fn typed(from: usize, to: usize, name: &str, kind: &str) -> SliceInstruction {
    SliceInstruction {
        kind: Some(kind.to_string()),
        ..raw(from, to, name)
    }
}

/// Everything from `from` to the end of the payload
fn tail(from: usize, name: &str) -> SliceInstruction {
    SliceInstruction {
        from,
        name: Some(name.to_string()),
        ..Default::default()
    }
}

/// Trailing data that may be missing altogether
fn rest(from: usize, name: &str) -> SliceInstruction {
    SliceInstruction {
        optional: Some(true),
        ..tail(from, name)
    }
}
