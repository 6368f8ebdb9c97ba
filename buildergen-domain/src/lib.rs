//! Domain logic: decide which fields a builder may gain and plan the edits that get it there.
//!
//! This crate owns *what* changes and why. Applying a plan to a declaration tree is the
//! `buildergen-edit` crate's job.

mod eligibility;
mod hierarchy;
mod ports;
mod synthesizer;
pub mod templates;

pub use eligibility::FieldEligibilityResolver;
pub use hierarchy::{find_nested, superclass_chain, visible_fields};
pub use ports::{NoTypes, TypeLookup};
pub use synthesizer::{BuilderSynthesizer, SynthesisConfig, SynthesisError};
