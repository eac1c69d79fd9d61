//! Specification storage on disk

mod catalog;

pub use catalog::SpecCatalog;
