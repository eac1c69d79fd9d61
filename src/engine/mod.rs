//! Decoding and matching engine
//!
//! Everything here is synchronous and pure: a call owns its [`Envelope`] and
//! never touches the [`Specification`](crate::domain::spec::Specification)
//! it was given.

mod envelope;
mod error;
mod matcher;
mod pipeline;
mod slicer;

pub use envelope::{DecodeResult, Envelope, Piece, Stage};
pub use error::{DecodeError, SliceEdge};
pub use matcher::{evaluate_condition, evaluate_predicate, find_match, resolve_field, spec_matches};
pub use pipeline::{decode, decode_value, decode_with, parse_payload};
pub use slicer::slice;
