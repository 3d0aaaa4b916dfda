//! # jobtmp-common
//!
//! Shared types, error definitions, configuration parsing, and constants
//! used across the entire jobtmp workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the primitives that the isolation backend,
//! the plugin runtime, and the CLI build upon.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
