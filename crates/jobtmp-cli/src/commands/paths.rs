//! `jobtmp paths`: show where a job's private directories live.
//!
//! Cleanup after the job ends is left to the scheduler's epilog; this
//! command tells it what to remove.

use std::path::Path;

use clap::Args;
use jobtmp_common::config::PluginConfig;
use jobtmp_runtime::job::{JobFacts, JobIdentity};
use jobtmp_runtime::paths::DerivedPaths;

/// Arguments for the `paths` command.
#[derive(Args, Debug)]
pub struct PathsArgs {
    /// Plugin options (`base=<path>`, `mount=<path>`).
    pub options: Vec<String>,

    /// Print only the private base directory.
    #[arg(long)]
    pub base_only: bool,
}

/// Executes the `paths` command.
///
/// # Errors
///
/// Returns an error if the options are invalid, the job id or uid is
/// unknown, or a derived path is too long.
pub fn execute(args: PathsArgs, plugstack: Option<&Path>, job: &JobFacts) -> anyhow::Result<()> {
    let options = super::resolve_options(args.options, plugstack)?;
    let config = PluginConfig::from_args(&options)?;
    let identity = JobIdentity::resolve(job)?;
    let paths = DerivedPaths::derive(&config, &identity)?;

    let rendered = render(&paths, args.base_only)?;
    #[allow(clippy::print_stdout)]
    {
        println!("{rendered}");
    }
    Ok(())
}

fn render(paths: &DerivedPaths, base_only: bool) -> serde_json::Result<String> {
    if base_only {
        Ok(paths.private_base.display().to_string())
    } else {
        serde_json::to_string_pretty(paths)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn derived() -> DerivedPaths {
        let config = PluginConfig::from_args(&["base=/tmp/slurm", "mount=/var/tmp"]).unwrap();
        let job = JobFacts {
            job_id: Some(42),
            uid: Some(1000),
            ..JobFacts::default()
        };
        DerivedPaths::derive(&config, &JobIdentity::resolve(&job).unwrap()).unwrap()
    }

    #[test]
    fn base_only_renders_the_bare_path() {
        assert_eq!(render(&derived(), true).unwrap(), "/tmp/slurm.42.0");
    }

    #[test]
    fn full_rendering_is_json() {
        let json: serde_json::Value =
            serde_json::from_str(&render(&derived(), false).unwrap()).unwrap();
        assert_eq!(json["bindings"][0]["backing"], "/tmp/slurm.42.0/var_tmp");
    }
}
