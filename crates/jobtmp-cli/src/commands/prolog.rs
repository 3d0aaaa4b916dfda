//! `jobtmp prolog`: create the job's private directories.

use std::path::Path;

use clap::Args;
use jobtmp_runtime::context::PrivateTmp;
use jobtmp_runtime::job::JobFacts;

/// Arguments for the `prolog` command.
#[derive(Args, Debug)]
pub struct PrologArgs {
    /// Plugin options (`base=<path>`, `mount=<path>`).
    pub options: Vec<String>,
}

/// Executes the `prolog` command.
///
/// Must run with enough privilege to create directories under the base
/// and change their owner. A non-zero exit should deny the job launch.
///
/// # Errors
///
/// Returns an error if any stage of job setup fails.
pub fn execute(args: PrologArgs, plugstack: Option<&Path>, job: &JobFacts) -> anyhow::Result<()> {
    let options = super::resolve_options(args.options, plugstack)?;
    let mut ctx = PrivateTmp::new();
    ctx.initialize(&options)?;
    ctx.job_setup(job, &options)?;
    if let Some(paths) = ctx.paths() {
        tracing::info!(base = %paths.private_base.display(), "job setup complete");
    }
    Ok(())
}
