//! Library half of the `buildergen` binary: configuration discovery and merging.

pub mod config;
