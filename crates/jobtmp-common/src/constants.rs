//! System-wide constants and defaults.

/// Plugin name used as a prefix in log messages and to locate the
/// plugin's line in `plugstack.conf`.
pub const PLUGIN_NAME: &str = "private-tmpdir";

/// Base path template used when no `base=` option is given.
pub const DEFAULT_BASE: &str = "/tmp/slurm";

/// Maximum number of `mount=` options accepted per plugin stanza.
pub const MAX_MOUNT_TARGETS: usize = 16;

/// Permission bits for the private base and every backing directory.
pub const PRIVATE_DIR_MODE: u32 = 0o700;

/// Longest derived path accepted, in bytes, excluding the trailing NUL
/// the kernel interface requires.
#[allow(clippy::cast_sign_loss)]
pub const MAX_PATH_LEN: usize = libc::PATH_MAX as usize - 1;

/// Option prefix overriding the base path template.
pub const BASE_OPTION: &str = "base=";

/// Option prefix declaring a mount target.
pub const MOUNT_OPTION: &str = "mount=";
