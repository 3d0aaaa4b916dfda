//! Derivation of a job's private base directory and backing directories.
//!
//! Pure and deterministic: the same configuration and job identity always
//! yield the same paths, which is what lets independent processes of one
//! job agree on them without sharing any state.
//!
//! ```text
//! base=/tmp/slurm, job 42, restart 0, mount=/var/tmp
//!
//! /tmp/slurm.42.0            private base
//! /tmp/slurm.42.0/var_tmp    backing directory, bound onto /var/tmp
//! ```

use std::path::{Path, PathBuf};

use jobtmp_common::config::PluginConfig;
use jobtmp_common::constants::MAX_PATH_LEN;
use jobtmp_common::error::{JobTmpError, Result};
use jobtmp_common::types::MountTarget;
use serde::Serialize;

use crate::job::JobIdentity;

/// A mount target paired with the private directory bound onto it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// Directory hidden behind the private copy.
    pub target: MountTarget,
    /// Private directory under the base that replaces it.
    pub backing: PathBuf,
}

/// Every path a job's private view is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedPaths {
    /// `{base}.{job_id}.{restart_count}`
    pub private_base: PathBuf,
    /// One entry per configured mount target, in bind order.
    pub bindings: Vec<Binding>,
}

impl DerivedPaths {
    /// Computes the private paths for a job.
    ///
    /// # Errors
    ///
    /// Returns [`JobTmpError::PathTooLong`] if the private base or any
    /// backing path exceeds [`MAX_PATH_LEN`]. Nothing is truncated.
    pub fn derive(config: &PluginConfig, identity: &JobIdentity) -> Result<Self> {
        let private_base = private_base(config.base(), identity)?;
        let bindings = config
            .mounts()
            .iter()
            .map(|target| {
                Ok(Binding {
                    target: target.clone(),
                    backing: backing_path(&private_base, target)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            private_base,
            bindings,
        })
    }
}

/// Builds `{base}.{job_id}.{restart_count}`.
///
/// # Errors
///
/// Returns [`JobTmpError::PathTooLong`] if the result exceeds [`MAX_PATH_LEN`].
pub fn private_base(base: &str, identity: &JobIdentity) -> Result<PathBuf> {
    let path = format!("{base}.{}.{}", identity.job_id, identity.restart_count);
    checked(PathBuf::from(path))
}

/// Builds the backing directory for `target` under `private_base`.
///
/// # Errors
///
/// Returns [`JobTmpError::PathTooLong`] if the result exceeds [`MAX_PATH_LEN`].
pub fn backing_path(private_base: &Path, target: &MountTarget) -> Result<PathBuf> {
    let mut path = private_base.as_os_str().to_owned();
    path.push(flatten_target(target));
    checked(PathBuf::from(path))
}

/// Flattens a target into a single path component, keeping its leading `/`.
///
/// Interior `/` becomes `_`. A literal `_` is written as `%5F` and a literal
/// `%` as `%25`, so two different targets never flatten to the same name.
#[must_use]
pub fn flatten_target(target: &MountTarget) -> String {
    let raw = target.as_str();
    let mut out = String::with_capacity(raw.len() + 8);
    out.push('/');
    for c in raw.chars().skip(1) {
        match c {
            '/' => out.push('_'),
            '_' => out.push_str("%5F"),
            '%' => out.push_str("%25"),
            other => out.push(other),
        }
    }
    out
}

fn checked(path: PathBuf) -> Result<PathBuf> {
    if path.as_os_str().len() > MAX_PATH_LEN {
        return Err(JobTmpError::PathTooLong {
            path,
            limit: MAX_PATH_LEN,
        });
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn identity(job_id: u32, restart_count: u32) -> JobIdentity {
        JobIdentity {
            job_id,
            restart_count,
            uid: 1000,
            gid: 1000,
        }
    }

    fn target(path: &str) -> MountTarget {
        MountTarget::new(path).unwrap()
    }

    #[test]
    fn private_base_appends_job_and_restart() {
        let base = private_base("/tmp/slurm", &identity(42, 0)).unwrap();
        assert_eq!(base, Path::new("/tmp/slurm.42.0"));
    }

    #[test]
    fn private_base_distinguishes_restarts() {
        let first = private_base("/tmp/slurm", &identity(42, 0)).unwrap();
        let second = private_base("/tmp/slurm", &identity(42, 1)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn top_level_target_keeps_its_name() {
        assert_eq!(flatten_target(&target("/tmp")), "/tmp");
    }

    #[test]
    fn interior_slashes_become_underscores() {
        assert_eq!(flatten_target(&target("/var/tmp")), "/var_tmp");
        assert_eq!(flatten_target(&target("/a/b/c")), "/a_b_c");
    }

    #[test]
    fn literal_underscore_cannot_collide_with_slash() {
        let slash = flatten_target(&target("/a/b"));
        let underscore = flatten_target(&target("/a_b"));
        assert_eq!(slash, "/a_b");
        assert_eq!(underscore, "/a%5Fb");
        assert_ne!(slash, underscore);
    }

    #[test]
    fn literal_percent_is_escaped() {
        assert_eq!(flatten_target(&target("/a%5Fb")), "/a%255Fb");
    }

    #[test]
    fn derive_builds_backing_paths_in_order() {
        let config =
            PluginConfig::from_args(&["base=/tmp/slurm", "mount=/var/tmp", "mount=/tmp"])
                .unwrap();
        let paths = DerivedPaths::derive(&config, &identity(42, 0)).unwrap();

        assert_eq!(paths.private_base, Path::new("/tmp/slurm.42.0"));
        let backings: Vec<_> = paths.bindings.iter().map(|b| b.backing.clone()).collect();
        assert_eq!(
            backings,
            vec![
                PathBuf::from("/tmp/slurm.42.0/var_tmp"),
                PathBuf::from("/tmp/slurm.42.0/tmp"),
            ]
        );
        assert_eq!(paths.bindings[0].target.as_str(), "/var/tmp");
    }

    #[test]
    fn overlong_base_is_rejected_not_truncated() {
        let base = format!("/{}", "x".repeat(MAX_PATH_LEN));
        let err = private_base(&base, &identity(1, 0)).unwrap_err();
        assert!(matches!(err, JobTmpError::PathTooLong { limit, .. } if limit == MAX_PATH_LEN));
    }

    #[test]
    fn overlong_backing_path_is_rejected() {
        let base = format!("/{}", "b".repeat(MAX_PATH_LEN - 20));
        let long_target = format!("/{}", "t".repeat(40));
        let config =
            PluginConfig::from_args(&[format!("base={base}"), format!("mount={long_target}")])
                .unwrap();
        let err = DerivedPaths::derive(&config, &identity(1, 0)).unwrap_err();
        match err {
            JobTmpError::PathTooLong { path, .. } => {
                assert!(path.as_os_str().len() > MAX_PATH_LEN);
                assert!(path.to_string_lossy().ends_with(&long_target));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn path_at_the_limit_is_accepted() {
        let suffix = ".1.0";
        let base = format!("/{}", "b".repeat(MAX_PATH_LEN - 1 - suffix.len()));
        let path = private_base(&base, &identity(1, 0)).unwrap();
        assert_eq!(path.as_os_str().len(), MAX_PATH_LEN);
    }

    #[test]
    fn dot_targets_cannot_escape_the_base() {
        assert!(PluginConfig::from_args(&["mount=/."]).is_err());
        assert!(PluginConfig::from_args(&["mount=/.."]).is_err());
    }

    #[test]
    fn serializes_for_cleanup_scripts() {
        let config = PluginConfig::from_args(&["mount=/var/tmp"]).unwrap();
        let paths = DerivedPaths::derive(&config, &identity(42, 1)).unwrap();
        let json = serde_json::to_value(&paths).unwrap();
        assert_eq!(json["private_base"], "/tmp/slurm.42.1");
        assert_eq!(json["bindings"][0]["target"], "/var/tmp");
        assert_eq!(json["bindings"][0]["backing"], "/tmp/slurm.42.1/var_tmp");
    }

    fn component() -> impl Strategy<Value = String> {
        "[a-z_%.]{1,6}".prop_filter("dot components are rejected", |c| c != "." && c != "..")
    }

    fn target_path() -> impl Strategy<Value = String> {
        prop::collection::vec(component(), 1..5).prop_map(|parts| format!("/{}", parts.join("/")))
    }

    proptest! {
        #[test]
        fn derivation_is_deterministic(job_id in any::<u32>(), restart in any::<u32>(), t in target_path()) {
            let config = PluginConfig::from_args(&[format!("mount={t}")]).unwrap();
            let first = DerivedPaths::derive(&config, &identity(job_id, restart)).unwrap();
            let second = DerivedPaths::derive(&config, &identity(job_id, restart)).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn distinct_targets_get_distinct_backing_paths(a in target_path(), b in target_path()) {
            prop_assume!(a != b);
            prop_assert_ne!(flatten_target(&target(&a)), flatten_target(&target(&b)));
        }

        #[test]
        fn backing_path_is_a_direct_child_of_the_base(t in target_path()) {
            let base = private_base("/tmp/slurm", &identity(7, 0)).unwrap();
            let backing = backing_path(&base, &target(&t)).unwrap();
            prop_assert_eq!(backing.parent(), Some(base.as_path()));
        }
    }
}
