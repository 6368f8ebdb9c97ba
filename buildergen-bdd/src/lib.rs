//! BDD harness (cucumber-rs).
//!
//! Scenarios drive the `buildergen` binary end to end; see `features/` and
//! `tests/cucumber.rs`.
