//! Specification-driven payload decoding
//!
//! Decodes rollup input payloads according to user-authored
//! [`Specification`]s and picks the specification that applies to an input.
//!
//! ```no_run
//! use specdec::{decode, find_match, parse_payload, system_specifications, MatchInput};
//!
//! let specs = system_specifications();
//! let input = MatchInput {
//!     msg_sender: Some(specdec::system::ERC20_PORTAL.to_string()),
//!     application: None,
//! };
//! if let Some(spec) = find_match(Some(&input), &specs) {
//!     let payload = parse_payload("0x01").unwrap();
//!     let envelope = decode(spec, &payload);
//!     println!("{:?}", envelope.error);
//! }
//! ```

pub mod config;
pub mod domain;
pub mod engine;
pub mod export;
pub mod infrastructure;
pub mod store;
pub mod system;

pub use domain::abi::{AbiDecoder, AbiParam, DecodedCall, DecodedValue};
pub use domain::spec::{
    Condition, ConditionField, ConditionOperator, LogicalOperator, MatchInput, Predicate,
    SliceInstruction, SpecMode, Specification,
};
pub use engine::{
    decode, decode_value, decode_with, find_match, parse_payload, DecodeError, DecodeResult,
    Envelope, Piece, Stage,
};
pub use infrastructure::abi::AlloyAbiDecoder;
pub use store::SpecCatalog;
pub use system::system_specifications;
