//! Per-job private temporary directories for batch-scheduled jobs.
//!
//! The scheduler calls into a [`PrivateTmp`](context::PrivateTmp) context at
//! four lifecycle points per process. The context parses the plugin options,
//! resolves the job's identity, derives the private paths, provisions them
//! in the job-setup phase, and binds them over their targets inside a fresh
//! mount namespace.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod context;
pub mod isolate;
pub mod job;
pub mod paths;
pub mod provision;
