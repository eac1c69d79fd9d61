//! Specification domain models
//!
//! A [`Specification`] tells the engine how to slice and decode a payload and
//! which inputs it applies to. The serde representation is the import/export
//! format, so field names and mode tags must stay stable.

mod predicate;
mod specification;

pub use predicate::{
    ApplicationRef, Condition, ConditionField, ConditionOperator, LogicalOperator, MatchInput,
    Predicate,
};
pub use specification::{
    AbiParamsMode, JsonAbiMode, SliceInstruction, SpecMode, Specification, SUPPORTED_MODES,
};
