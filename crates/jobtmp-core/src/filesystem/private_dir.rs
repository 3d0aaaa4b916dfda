//! Owner-only directories handed over to the job's user.

use std::path::Path;

use jobtmp_common::error::{JobTmpError, Result};
use jobtmp_common::types::ProvisionStep;

fn step_failed(step: ProvisionStep, path: &Path, source: std::io::Error) -> JobTmpError {
    JobTmpError::ProvisionFailed {
        step,
        path: path.to_path_buf(),
        source,
    }
}

/// Creates a single directory with the given permission bits.
///
/// Parent directories are not created and an existing entry at `path` is an
/// error: a leftover from an earlier attempt must not be reused silently.
///
/// # Errors
///
/// Returns [`JobTmpError::ProvisionFailed`] if `mkdir(2)` fails.
pub fn create_dir(path: &Path, mode: u32) -> Result<()> {
    use nix::sys::stat::Mode;

    #[allow(clippy::unnecessary_cast, clippy::cast_possible_truncation)]
    let mode = Mode::from_bits_truncate(mode as libc::mode_t);
    nix::unistd::mkdir(path, mode)
        .map_err(|e| step_failed(ProvisionStep::CreateDir, path, e.into()))?;
    tracing::debug!(
        path = %path.display(),
        mode = %format!("{:o}", mode.bits()),
        "created directory"
    );
    Ok(())
}

/// Changes the owner and group of `path`.
///
/// # Errors
///
/// Returns [`JobTmpError::ProvisionFailed`] if `chown(2)` fails.
pub fn chown(path: &Path, uid: u32, gid: u32) -> Result<()> {
    use nix::unistd::{Gid, Uid};

    nix::unistd::chown(path, Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid)))
        .map_err(|e| step_failed(ProvisionStep::Chown, path, e.into()))?;
    tracing::debug!(path = %path.display(), uid, gid, "changed ownership");
    Ok(())
}
