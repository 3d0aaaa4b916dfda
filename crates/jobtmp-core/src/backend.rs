//! Isolation backend abstraction.
//!
//! Bundles the privileged primitives behind one trait so the plugin runtime
//! can drive them without knowing whether it talks to the kernel or to a
//! test double.

use std::path::Path;

use jobtmp_common::error::Result;

use crate::{filesystem, namespace};

/// Privileged operations needed to provision and isolate a job's private
/// directories.
///
/// Implementors must not retry or roll back: each call either performs its
/// single operation or reports why it failed.
pub trait IsolationBackend {
    /// Creates one directory with the given permission bits.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionFailed`](jobtmp_common::error::JobTmpError::ProvisionFailed)
    /// if the directory cannot be created, including when it already exists.
    fn create_dir(&self, path: &Path, mode: u32) -> Result<()>;

    /// Hands `path` over to `uid`:`gid`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionFailed`](jobtmp_common::error::JobTmpError::ProvisionFailed)
    /// if ownership cannot be changed.
    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()>;

    /// Marks `/` recursively shared.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceSetupFailed`](jobtmp_common::error::JobTmpError::NamespaceSetupFailed).
    fn make_root_shared(&self) -> Result<()>;

    /// Moves the calling process into a new mount namespace.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceSetupFailed`](jobtmp_common::error::JobTmpError::NamespaceSetupFailed).
    fn unshare_mount_namespace(&self) -> Result<()>;

    /// Marks `/` recursively slave.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceSetupFailed`](jobtmp_common::error::JobTmpError::NamespaceSetupFailed).
    fn make_root_slave(&self) -> Result<()>;

    /// Bind-mounts `source` onto `target`.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceSetupFailed`](jobtmp_common::error::JobTmpError::NamespaceSetupFailed).
    fn bind_mount(&self, source: &Path, target: &Path) -> Result<()>;

    /// Returns whether this backend can operate on the current platform.
    fn is_available(&self) -> bool;
}

/// Backend that issues the real Linux syscalls.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxBackend;

impl LinuxBackend {
    /// Creates a new Linux backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl IsolationBackend for LinuxBackend {
    fn create_dir(&self, path: &Path, mode: u32) -> Result<()> {
        filesystem::private_dir::create_dir(path, mode)
    }

    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        filesystem::private_dir::chown(path, uid, gid)
    }

    fn make_root_shared(&self) -> Result<()> {
        namespace::mount::make_root_shared()
    }

    fn unshare_mount_namespace(&self) -> Result<()> {
        namespace::mount::create_mount_namespace()
    }

    fn make_root_slave(&self) -> Result<()> {
        namespace::mount::make_root_slave()
    }

    fn bind_mount(&self, source: &Path, target: &Path) -> Result<()> {
        filesystem::mount::bind_mount(source, target)
    }

    fn is_available(&self) -> bool {
        cfg!(target_os = "linux")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_backend_reports_platform_support() {
        let backend: &dyn IsolationBackend = &LinuxBackend::new();
        assert_eq!(backend.is_available(), cfg!(target_os = "linux"));
    }

    #[test]
    fn linux_backend_creates_directories() {
        use std::os::unix::fs::MetadataExt;

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("private");
        let backend = LinuxBackend::new();

        backend.create_dir(&dir, 0o700).unwrap();
        let meta = std::fs::metadata(&dir).unwrap();
        backend.chown(&dir, meta.uid(), meta.gid()).unwrap();
        assert!(dir.is_dir());
    }
}
