//! Creation of a job's private directories during job setup.

use jobtmp_common::constants::PRIVATE_DIR_MODE;
use jobtmp_common::error::Result;
use jobtmp_core::backend::IsolationBackend;

use crate::job::JobIdentity;
use crate::paths::DerivedPaths;

/// Creates the private base and every backing directory, owner-only and
/// owned by the job's user and group.
///
/// The base comes first, then each backing directory in bind order. The
/// first failure stops the sequence; directories already created are left
/// in place for the scheduler's cleanup to remove.
///
/// # Errors
///
/// Returns [`ProvisionFailed`](jobtmp_common::error::JobTmpError::ProvisionFailed)
/// naming the directory that could not be created or handed over.
pub fn provision(
    backend: &dyn IsolationBackend,
    paths: &DerivedPaths,
    identity: &JobIdentity,
) -> Result<()> {
    let dirs = std::iter::once(paths.private_base.as_path())
        .chain(paths.bindings.iter().map(|b| b.backing.as_path()));
    for dir in dirs {
        backend.create_dir(dir, PRIVATE_DIR_MODE)?;
        backend.chown(dir, identity.uid, identity.gid)?;
    }
    tracing::info!(
        job_id = identity.job_id,
        base = %paths.private_base.display(),
        backing_dirs = paths.bindings.len(),
        "provisioned private directories"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    use jobtmp_common::config::PluginConfig;
    use jobtmp_common::error::JobTmpError;
    use jobtmp_common::types::ProvisionStep;
    use jobtmp_core::backend::LinuxBackend;

    use super::*;

    fn current_owner(dir: &std::path::Path, job_id: u32) -> JobIdentity {
        let meta = std::fs::metadata(dir).unwrap();
        JobIdentity {
            job_id,
            restart_count: 0,
            uid: meta.uid(),
            gid: meta.gid(),
        }
    }

    #[test]
    fn creates_base_and_backing_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let identity = current_owner(tmp.path(), 42);
        let base = tmp.path().join("slurm");
        let config = PluginConfig::from_args(&[
            format!("base={}", base.display()),
            "mount=/tmp".into(),
            "mount=/var/tmp".into(),
        ])
        .unwrap();
        let paths = DerivedPaths::derive(&config, &identity).unwrap();

        provision(&LinuxBackend::new(), &paths, &identity).unwrap();

        for dir in [
            tmp.path().join("slurm.42.0"),
            tmp.path().join("slurm.42.0/tmp"),
            tmp.path().join("slurm.42.0/var_tmp"),
        ] {
            let meta = std::fs::metadata(&dir).unwrap();
            assert!(meta.is_dir(), "{} missing", dir.display());
            assert_eq!(meta.permissions().mode() & 0o777, 0o700);
            assert_eq!(meta.uid(), identity.uid);
        }
    }

    #[test]
    fn existing_file_at_base_aborts_before_backing_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let identity = current_owner(tmp.path(), 7);
        std::fs::write(tmp.path().join("slurm.7.0"), b"").unwrap();
        let config = PluginConfig::from_args(&[
            format!("base={}", tmp.path().join("slurm").display()),
            "mount=/tmp".into(),
        ])
        .unwrap();
        let paths = DerivedPaths::derive(&config, &identity).unwrap();

        let err = provision(&LinuxBackend::new(), &paths, &identity).unwrap_err();

        match err {
            JobTmpError::ProvisionFailed { step, path, .. } => {
                assert_eq!(step, ProvisionStep::CreateDir);
                assert_eq!(path, paths.private_base);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
