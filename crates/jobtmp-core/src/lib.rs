//! # jobtmp-core
//!
//! Low-level Linux primitives for per-job private directories.
//!
//! This crate provides safe abstractions over:
//! - **Filesystem**: owner-only directory creation, ownership transfer, and
//!   bind mounts.
//! - **Namespaces**: mount propagation changes on `/` and `unshare(2)` of the
//!   mount namespace.
//! - **Backend**: the [`IsolationBackend`](backend::IsolationBackend) trait
//!   that bundles these primitives so callers can substitute them in tests.
//!
//! Every primitive maps its OS error into the workspace error taxonomy with
//! the failing step and path attached.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod backend;
pub mod filesystem;
pub mod namespace;
