//! ABI infrastructure - alloy-based parsing and decoding

mod decoder;
mod params;

pub use decoder::AlloyAbiDecoder;
pub use params::parse_declarations;
