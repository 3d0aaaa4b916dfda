//! Unified error types for the jobtmp workspace.
//!
//! Every failure in this system is fatal to the lifecycle call that hit it.
//! There is no retry tier; the caller turns an error into a job-launch denial.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{MountStep, ProvisionStep};

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum JobTmpError {
    /// An option from the plugin stanza is malformed, unknown, or exceeds a limit.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the invalid option.
        message: String,
    },

    /// A required job fact could not be obtained from the scheduler.
    #[error("unable to get job's {fact} from the scheduler")]
    SchedulerQueryFailed {
        /// Name of the missing fact.
        fact: &'static str,
    },

    /// A derived path does not fit within the platform path-length bound.
    #[error("\"{}\" too large ({} bytes, limit {limit})", .path.display(), .path.as_os_str().len())]
    PathTooLong {
        /// The offending path.
        path: PathBuf,
        /// Maximum accepted length in bytes.
        limit: usize,
    },

    /// A private directory could not be created or handed to the job owner.
    #[error("{step}({}) failed: {source}", .path.display())]
    ProvisionFailed {
        /// Operation that failed.
        step: ProvisionStep,
        /// Directory the operation was applied to.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// One of the ordered mount-namespace steps failed.
    #[error("failed to {step} ({}): {source}", .path.display())]
    NamespaceSetupFailed {
        /// Step of the mount sequence that failed.
        step: MountStep,
        /// Path the step operated on.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },
}

impl JobTmpError {
    /// Shorthand for a [`JobTmpError::InvalidConfig`] with a formatted message.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, JobTmpError>;
