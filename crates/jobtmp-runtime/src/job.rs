//! Job identity as reported by the scheduler.

use jobtmp_common::error::{JobTmpError, Result};
use serde::{Deserialize, Serialize};

/// Queries answered by the scheduler for the current process.
///
/// `None` means the scheduler could not provide the fact.
pub trait JobSource {
    /// Numeric job id.
    fn job_id(&self) -> Option<u32>;
    /// User id owning the job.
    fn job_uid(&self) -> Option<u32>;
    /// Group id owning the job.
    fn job_gid(&self) -> Option<u32>;
    /// Number of times the job has been relaunched.
    fn restart_count(&self) -> Option<u32>;
    /// Whether this process runs on a node executing the job.
    fn is_remote(&self) -> bool;
}

/// Job facts gathered up front, usable as a [`JobSource`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFacts {
    /// Numeric job id.
    pub job_id: Option<u32>,
    /// User id owning the job.
    pub uid: Option<u32>,
    /// Group id owning the job.
    pub gid: Option<u32>,
    /// Relaunch counter.
    pub restart_count: Option<u32>,
    /// Whether this is a remote execution context.
    pub remote: bool,
}

impl JobSource for JobFacts {
    fn job_id(&self) -> Option<u32> {
        self.job_id
    }

    fn job_uid(&self) -> Option<u32> {
        self.uid
    }

    fn job_gid(&self) -> Option<u32> {
        self.gid
    }

    fn restart_count(&self) -> Option<u32> {
        self.restart_count
    }

    fn is_remote(&self) -> bool {
        self.remote
    }
}

/// The facts about a job that determine its private paths and ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobIdentity {
    /// Numeric job id.
    pub job_id: u32,
    /// Relaunch counter, 0 when unknown.
    pub restart_count: u32,
    /// Owner of the private directories.
    pub uid: u32,
    /// Group of the private directories, 0 when unknown.
    pub gid: u32,
}

impl JobIdentity {
    /// Queries the scheduler for the job's identity.
    ///
    /// Job id and uid are required. A missing gid or restart count falls
    /// back to 0 and is logged as degraded.
    ///
    /// # Errors
    ///
    /// Returns [`JobTmpError::SchedulerQueryFailed`] if the job id or the
    /// owning uid is unavailable.
    pub fn resolve(source: &dyn JobSource) -> Result<Self> {
        let job_id = source
            .job_id()
            .ok_or(JobTmpError::SchedulerQueryFailed { fact: "job id" })?;
        let uid = source
            .job_uid()
            .ok_or(JobTmpError::SchedulerQueryFailed { fact: "user id" })?;
        let gid = source.job_gid().unwrap_or_else(|| {
            tracing::warn!(job_id, "unable to get job's group id, using 0");
            0
        });
        let restart_count = source.restart_count().unwrap_or_else(|| {
            tracing::warn!(job_id, "unable to get job's restart count, using 0");
            0
        });
        tracing::debug!(job_id, uid, gid, restart_count, "resolved job identity");
        Ok(Self {
            job_id,
            restart_count,
            uid,
            gid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts() -> JobFacts {
        JobFacts {
            job_id: Some(42),
            uid: Some(1000),
            gid: Some(100),
            restart_count: Some(3),
            remote: true,
        }
    }

    #[test]
    fn resolve_uses_every_reported_fact() {
        let identity = JobIdentity::resolve(&facts()).unwrap();
        assert_eq!(
            identity,
            JobIdentity {
                job_id: 42,
                restart_count: 3,
                uid: 1000,
                gid: 100,
            }
        );
    }

    #[test]
    fn missing_job_id_is_fatal() {
        let source = JobFacts {
            job_id: None,
            ..facts()
        };
        let err = JobIdentity::resolve(&source).unwrap_err();
        assert!(matches!(
            err,
            JobTmpError::SchedulerQueryFailed { fact: "job id" }
        ));
    }

    #[test]
    fn missing_uid_is_fatal() {
        let source = JobFacts {
            uid: None,
            ..facts()
        };
        let err = JobIdentity::resolve(&source).unwrap_err();
        assert!(matches!(
            err,
            JobTmpError::SchedulerQueryFailed { fact: "user id" }
        ));
    }

    #[test]
    fn missing_gid_and_restart_count_default_to_zero() {
        let source = JobFacts {
            gid: None,
            restart_count: None,
            ..facts()
        };
        let identity = JobIdentity::resolve(&source).unwrap();
        assert_eq!(identity.gid, 0);
        assert_eq!(identity.restart_count, 0);
        assert_eq!(identity.uid, 1000);
    }
}
