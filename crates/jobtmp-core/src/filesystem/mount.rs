//! Bind mounts of private directories over their targets.

use std::path::Path;

use jobtmp_common::error::{JobTmpError, Result};
use jobtmp_common::types::MountStep;

/// Creates a bind mount from `source` onto `target` (`mount --bind`).
///
/// Only meaningful after the calling process has its own mount namespace;
/// otherwise the mount is visible to the whole host.
///
/// # Errors
///
/// Returns [`JobTmpError::NamespaceSetupFailed`] if the `mount(2)` syscall
/// fails. The error carries `target` as its path.
#[cfg(target_os = "linux")]
pub fn bind_mount(source: &Path, target: &Path) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    tracing::debug!(
        source = %source.display(),
        target = %target.display(),
        "creating bind mount"
    );
    mount(
        Some(source),
        target,
        None::<&str>,
        MsFlags::MS_BIND,
        None::<&str>,
    )
    .map_err(|e| JobTmpError::NamespaceSetupFailed {
        step: MountStep::BindMount,
        path: target.to_path_buf(),
        source: e.into(),
    })
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: bind mounts require Linux.
#[cfg(not(target_os = "linux"))]
pub fn bind_mount(_source: &Path, target: &Path) -> Result<()> {
    Err(JobTmpError::NamespaceSetupFailed {
        step: MountStep::BindMount,
        path: target.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "Linux required for bind mounts",
        ),
    })
}
