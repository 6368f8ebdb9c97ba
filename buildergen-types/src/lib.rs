//! Shared DTOs (schemas-as-code) for the buildergen workspace.
//!
//! # Design constraints
//! - These types are intended to be serialized to disk.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod apply;
pub mod decl;
pub mod ops;
pub mod plan;

/// Schema identifiers.
pub mod schema {
    pub const BUILDERGEN_UNIT_V1: &str = "buildergen.unit.v1";
    pub const BUILDERGEN_PLAN_V1: &str = "buildergen.plan.v1";
    pub const BUILDERGEN_APPLY_V1: &str = "buildergen.apply.v1";
}
