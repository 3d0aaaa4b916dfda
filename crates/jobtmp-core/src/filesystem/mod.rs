//! Filesystem operations for private job directories.
//!
//! Provides owner-only directory creation with ownership transfer, and
//! bind mounts of those directories over their targets.

pub mod mount;
pub mod private_dir;
