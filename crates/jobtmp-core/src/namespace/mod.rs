//! Linux mount namespace management.
//!
//! Provides safe wrappers around `unshare(2)` and the propagation-type
//! changes on `/` that surround it.

pub mod mount;
