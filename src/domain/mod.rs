//! Domain layer - plain data models and contracts
//!
//! Nothing in here performs decoding; the types describe what a
//! specification looks like on the wire and what a decode produces.

pub mod abi;
pub mod spec;
