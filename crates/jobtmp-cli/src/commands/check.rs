//! `jobtmp check`: validate plugin options.

use std::path::Path;

use clap::Args;
use jobtmp_runtime::context::PrivateTmp;

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Plugin options (`base=<path>`, `mount=<path>`).
    pub options: Vec<String>,
}

/// Executes the `check` command.
///
/// # Errors
///
/// Returns an error if the options are invalid.
pub fn execute(args: CheckArgs, plugstack: Option<&Path>) -> anyhow::Result<()> {
    let options = super::resolve_options(args.options, plugstack)?;
    let mut ctx = PrivateTmp::new();
    ctx.initialize(&options)?;
    if let Some(config) = ctx.config() {
        #[allow(clippy::print_stdout)]
        {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}
