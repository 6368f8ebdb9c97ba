//! Embeddable host pipeline for buildergen.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking into an editor
//! plugin, a language server or any other host process.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`DocumentStore`](ports::DocumentStore): load and commit the declaration tree
//! - [`FieldSelector`](ports::FieldSelector): narrow the eligible fields
//! - [`WritePort`](ports::WritePort): write plan/apply artifacts
//!
//! The [`adapters`] module provides file-backed and in-memory implementations.
//!
//! # Entry points
//!
//! - [`run_candidates`](pipeline::run_candidates): list eligible fields
//! - [`run_plan`](pipeline::run_plan): synthesize a plan and preview patch
//! - [`run_apply`](pipeline::run_apply): apply a saved plan
//! - [`run_generate`](pipeline::run_generate): one-shot synthesis and commit

pub mod adapters;
pub mod locator;
pub mod locks;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use locator::Target;
pub use locks::UnitLocks;
