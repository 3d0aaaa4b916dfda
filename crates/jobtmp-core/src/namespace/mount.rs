//! Mount namespace isolation.
//!
//! The sequence used for a job is: mark `/` recursively shared, unshare the
//! mount namespace, then mark `/` recursively slave inside the new namespace.
//! Mounts made afterwards stay local to the new namespace while unmounts
//! from the host still propagate in.

use std::path::Path;

use jobtmp_common::error::{JobTmpError, Result};
use jobtmp_common::types::MountStep;

const ROOT: &str = "/";

fn step_failed(step: MountStep, path: &Path, source: std::io::Error) -> JobTmpError {
    JobTmpError::NamespaceSetupFailed {
        step,
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(target_os = "linux")]
fn change_root_propagation(step: MountStep, flag: nix::mount::MsFlags) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        None::<&str>,
        ROOT,
        None::<&str>,
        MsFlags::MS_REC | flag,
        None::<&str>,
    )
    .map_err(|e| step_failed(step, Path::new(ROOT), e.into()))
}

/// Marks `/` and every mount below it as shared (`mount --make-rshared /`).
///
/// # Errors
///
/// Returns [`JobTmpError::NamespaceSetupFailed`] if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn make_root_shared() -> Result<()> {
    change_root_propagation(MountStep::MakeRootShared, nix::mount::MsFlags::MS_SHARED)?;
    tracing::debug!("made / rshared");
    Ok(())
}

/// Marks `/` and every mount below it as slave (`mount --make-rslave /`).
///
/// # Errors
///
/// Returns [`JobTmpError::NamespaceSetupFailed`] if the `mount(2)` syscall fails.
#[cfg(target_os = "linux")]
pub fn make_root_slave() -> Result<()> {
    change_root_propagation(MountStep::MakeRootSlave, nix::mount::MsFlags::MS_SLAVE)?;
    tracing::debug!("made / rslave");
    Ok(())
}

/// Creates a new mount namespace for the calling process.
///
/// The process gets a private copy of the mount table; other processes,
/// including the parent, keep the original one.
///
/// # Errors
///
/// Returns [`JobTmpError::NamespaceSetupFailed`] if the `unshare(CLONE_NEWNS)`
/// syscall fails.
#[cfg(target_os = "linux")]
pub fn create_mount_namespace() -> Result<()> {
    use nix::sched::{CloneFlags, unshare};

    unshare(CloneFlags::CLONE_NEWNS).map_err(|e| {
        step_failed(MountStep::UnshareMountNamespace, Path::new(ROOT), e.into())
    })?;
    tracing::debug!("mount namespace created");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn unsupported(step: MountStep) -> JobTmpError {
    step_failed(
        step,
        Path::new(ROOT),
        std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "Linux required for mount namespace operations",
        ),
    )
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: mount propagation requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn make_root_shared() -> Result<()> {
    Err(unsupported(MountStep::MakeRootShared))
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: mount propagation requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn make_root_slave() -> Result<()> {
    Err(unsupported(MountStep::MakeRootSlave))
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: mount namespaces require Linux.
#[cfg(not(target_os = "linux"))]
pub fn create_mount_namespace() -> Result<()> {
    Err(unsupported(MountStep::UnshareMountNamespace))
}
