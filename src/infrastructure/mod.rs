//! Infrastructure layer - alloy-backed implementations of the domain traits

pub mod abi;
