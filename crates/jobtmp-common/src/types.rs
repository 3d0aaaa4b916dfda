//! Domain primitive types used across the jobtmp workspace.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{JobTmpError, Result};

/// An absolute directory that is hidden behind a per-job private copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MountTarget(String);

impl MountTarget {
    /// Validates and wraps a mount target path.
    ///
    /// # Errors
    ///
    /// Returns [`JobTmpError::InvalidConfig`] if the path is empty, does not
    /// start with `/`, is the root directory itself, or has a `.` or `..`
    /// component.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(JobTmpError::invalid_config(
                "no argument given to mount= option",
            ));
        }
        if !path.starts_with('/') {
            return Err(JobTmpError::invalid_config(format!(
                "mount= option must start with a '/': ({path})"
            )));
        }
        if path.bytes().all(|b| b == b'/') {
            return Err(JobTmpError::invalid_config(format!(
                "mount= option cannot be the root directory: ({path})"
            )));
        }
        if path.split('/').any(|part| part == "." || part == "..") {
            return Err(JobTmpError::invalid_config(format!(
                "mount= option cannot contain '.' or '..' components: ({path})"
            )));
        }
        Ok(Self(path))
    }

    /// Returns the target path as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the target path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl TryFrom<String> for MountTarget {
    type Error = JobTmpError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<MountTarget> for String {
    fn from(value: MountTarget) -> Self {
        value.0
    }
}

impl fmt::Display for MountTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operations performed while provisioning private directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProvisionStep {
    /// Directory creation with owner-only permissions.
    CreateDir,
    /// Ownership transfer to the job's user and group.
    Chown,
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir => write!(f, "mkdir"),
            Self::Chown => write!(f, "chown"),
        }
    }
}

/// The ordered steps of the mount-namespace sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MountStep {
    /// `mount --make-rshared /`
    MakeRootShared,
    /// `unshare(CLONE_NEWNS)`
    UnshareMountNamespace,
    /// `mount --make-rslave /`
    MakeRootSlave,
    /// `mount --bind <backing> <target>`
    BindMount,
}

impl fmt::Display for MountStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MakeRootShared => write!(f, "'mount --make-rshared'"),
            Self::UnshareMountNamespace => write!(f, "unshare mounts"),
            Self::MakeRootSlave => write!(f, "'mount --make-rslave'"),
            Self::BindMount => write!(f, "bind mount"),
        }
    }
}
