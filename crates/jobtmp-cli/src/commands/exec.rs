//! `jobtmp exec`: run a command inside the job's private mount namespace.

use std::os::unix::process::CommandExt;
use std::path::Path;

use clap::Args;
use jobtmp_runtime::context::PrivateTmp;
use jobtmp_runtime::job::JobFacts;

/// Arguments for the `exec` command.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Plugin options (`base=<path>`, `mount=<path>`).
    pub options: Vec<String>,

    /// Command to run once the private directories are bound.
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

/// Executes the `exec` command.
///
/// Binds the private directories in this process, then replaces it with
/// the command so the payload only ever sees the private view. Outside a
/// remote execution context the command runs unchanged.
///
/// # Errors
///
/// Returns an error if binding fails or the command cannot be executed.
pub fn execute(args: ExecArgs, plugstack: Option<&Path>, job: &JobFacts) -> anyhow::Result<()> {
    let options = super::resolve_options(args.options, plugstack)?;
    let mut ctx = PrivateTmp::new();
    ctx.initialize(&options)?;
    ctx.post_option_processing(job, &options)?;

    let Some((program, rest)) = args.command.split_first() else {
        anyhow::bail!("no command given");
    };
    tracing::debug!(program = %program, bound = ctx.is_bound(), "executing payload");
    let err = std::process::Command::new(program).args(rest).exec();
    Err(anyhow::anyhow!("failed to execute {program}: {err}"))
}
