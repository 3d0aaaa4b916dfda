//! The mount-namespace sequence that gives a process its private view.

use std::path::Path;

use jobtmp_common::error::{JobTmpError, Result};
use jobtmp_common::types::MountStep;
use jobtmp_core::backend::IsolationBackend;

use crate::paths::DerivedPaths;

/// Moves the calling process into its own mount namespace and binds every
/// backing directory over its target.
///
/// Steps, each fatal on failure:
/// 1. `mount --make-rshared /`
/// 2. `unshare(CLONE_NEWNS)`
/// 3. `mount --make-rslave /`
/// 4. `mount --bind <backing> <target>` per binding, in order
///
/// A backend that reports itself unavailable fails before step 1.
///
/// Nothing is undone on failure; a partially bound namespace is abandoned
/// together with the job launch.
///
/// # Errors
///
/// Returns [`NamespaceSetupFailed`](jobtmp_common::error::JobTmpError::NamespaceSetupFailed)
/// for the first step that fails.
pub fn isolate(backend: &dyn IsolationBackend, paths: &DerivedPaths, job_id: u32) -> Result<()> {
    if !backend.is_available() {
        return Err(JobTmpError::NamespaceSetupFailed {
            step: MountStep::MakeRootShared,
            path: Path::new("/").to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "mount namespaces are not available on this platform",
            ),
        });
    }
    backend.make_root_shared()?;
    backend.unshare_mount_namespace()?;
    backend.make_root_slave()?;
    for binding in &paths.bindings {
        tracing::debug!(
            job_id,
            backing = %binding.backing.display(),
            target = %binding.target,
            "mounting"
        );
        backend.bind_mount(&binding.backing, binding.target.as_path())?;
    }
    tracing::info!(job_id, binds = paths.bindings.len(), "private mount namespace ready");
    Ok(())
}
