//! CLI command definitions and dispatch.

pub mod check;
pub mod exec;
pub mod paths;
pub mod prolog;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use jobtmp_runtime::job::JobFacts;

/// jobtmp: per-job private temporary directories for batch jobs.
#[derive(Parser, Debug)]
#[command(name = "jobtmp", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Read plugin options from this plugstack.conf when none are given.
    #[arg(long, global = true, env = "JOBTMP_PLUGSTACK")]
    pub plugstack: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Job identity, normally taken from the scheduler's environment.
    #[command(flatten)]
    pub job: JobArgs,
}

/// Job facts, each overridable on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct JobArgs {
    /// Job id.
    #[arg(long, global = true, env = "SLURM_JOB_ID")]
    pub job_id: Option<u32>,

    /// User id owning the job.
    #[arg(long, global = true, env = "SLURM_JOB_UID")]
    pub uid: Option<u32>,

    /// Group id owning the job.
    #[arg(long, global = true, env = "SLURM_JOB_GID")]
    pub gid: Option<u32>,

    /// Number of times the job has been relaunched.
    #[arg(long, global = true, env = "SLURM_RESTART_COUNT")]
    pub restart_count: Option<u32>,

    /// Compute node name; when set, this is a remote execution context.
    #[arg(long, global = true, env = "SLURMD_NODENAME")]
    pub node: Option<String>,

    /// Treat this process as a remote execution context regardless of `--node`.
    #[arg(long, global = true)]
    pub remote: bool,
}

impl JobArgs {
    /// Collects the facts into a job source.
    #[must_use]
    pub fn facts(&self) -> JobFacts {
        JobFacts {
            job_id: self.job_id,
            uid: self.uid,
            gid: self.gid,
            restart_count: self.restart_count,
            remote: self.remote || self.node.is_some(),
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate plugin options and print the resulting configuration.
    Check(check::CheckArgs),
    /// Print the private paths the current job would use.
    Paths(paths::PathsArgs),
    /// Create the job's private directories (job setup).
    Prolog(prolog::PrologArgs),
    /// Enter the job's private mount namespace and run a command.
    Exec(exec::ExecArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let plugstack = cli.plugstack.as_deref();
    match cli.command {
        Command::Check(args) => check::execute(args, plugstack),
        Command::Paths(args) => paths::execute(args, plugstack, &cli.job.facts()),
        Command::Prolog(args) => prolog::execute(args, plugstack, &cli.job.facts()),
        Command::Exec(args) => exec::execute(args, plugstack, &cli.job.facts()),
    }
}

/// Picks the plugin options: explicit arguments first, then the plugin's
/// line in `plugstack`, then none.
///
/// # Errors
///
/// Returns an error if `plugstack` cannot be read.
pub fn resolve_options(
    explicit: Vec<String>,
    plugstack: Option<&std::path::Path>,
) -> anyhow::Result<Vec<String>> {
    if !explicit.is_empty() {
        return Ok(explicit);
    }
    let Some(path) = plugstack else {
        return Ok(Vec::new());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let options = crate::plugstack::plugin_args(&contents).unwrap_or_default();
    tracing::debug!(path = %path.display(), count = options.len(), "options from plugstack");
    Ok(options)
}
