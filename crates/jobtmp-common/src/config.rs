//! Plugin configuration model and option parsing.
//!
//! The scheduler hands the plugin the whitespace-separated arguments of its
//! `plugstack.conf` stanza. Two options are recognized:
//!
//! - `base=<path>` overrides the base path template (last one wins).
//! - `mount=<path>` appends a mount target (at most
//!   [`MAX_MOUNT_TARGETS`](crate::constants::MAX_MOUNT_TARGETS)).

use serde::{Deserialize, Serialize};

use crate::constants::{BASE_OPTION, DEFAULT_BASE, MAX_MOUNT_TARGETS, MOUNT_OPTION};
use crate::error::{JobTmpError, Result};
use crate::types::MountTarget;

/// Configuration resolved from the plugin stanza.
///
/// Deserialization goes through the same checks as option parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPluginConfig")]
pub struct PluginConfig {
    /// Base path template; the private base is `{base}.{job_id}.{restart_count}`.
    base: String,
    /// Directories bound onto private copies, in bind order.
    mounts: Vec<MountTarget>,
}

#[derive(Deserialize)]
struct RawPluginConfig {
    base: String,
    #[serde(default)]
    mounts: Vec<String>,
}

impl TryFrom<RawPluginConfig> for PluginConfig {
    type Error = JobTmpError;

    fn try_from(raw: RawPluginConfig) -> Result<Self> {
        let mut config = Self::default();
        config.set_base(&raw.base)?;
        for target in &raw.mounts {
            config.add_mount(target)?;
        }
        Ok(config)
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE.to_string(),
            mounts: Vec::new(),
        }
    }
}

impl PluginConfig {
    /// Parses the plugin stanza arguments.
    ///
    /// # Errors
    ///
    /// Returns [`JobTmpError::InvalidConfig`] on an unknown option, an empty
    /// `base=`, an invalid or repeated `mount=` target, or more than
    /// [`MAX_MOUNT_TARGETS`] mount targets.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut config = Self::default();
        for arg in args {
            config.apply(arg.as_ref())?;
        }
        tracing::debug!(
            base = %config.base,
            mounts = config.mounts.len(),
            "parsed plugin options"
        );
        Ok(config)
    }

    fn apply(&mut self, arg: &str) -> Result<()> {
        if let Some(base) = arg.strip_prefix(BASE_OPTION) {
            return self.set_base(base);
        }
        if let Some(target) = arg.strip_prefix(MOUNT_OPTION) {
            return self.add_mount(target);
        }
        Err(JobTmpError::invalid_config(format!("Invalid option \"{arg}\"")))
    }

    /// Replaces the base path template.
    ///
    /// # Errors
    ///
    /// Returns [`JobTmpError::InvalidConfig`] if `base` is empty.
    pub fn set_base(&mut self, base: &str) -> Result<()> {
        if base.is_empty() {
            return Err(JobTmpError::invalid_config(
                "no argument given to base= option",
            ));
        }
        base.clone_into(&mut self.base);
        Ok(())
    }

    /// Appends a mount target.
    ///
    /// The target list is left untouched when this returns an error.
    ///
    /// # Errors
    ///
    /// Returns [`JobTmpError::InvalidConfig`] if the list already holds
    /// [`MAX_MOUNT_TARGETS`] entries, if `target` is not a valid absolute
    /// path, or if it is already configured.
    pub fn add_mount(&mut self, target: &str) -> Result<()> {
        if self.mounts.len() == MAX_MOUNT_TARGETS {
            return Err(JobTmpError::invalid_config(format!(
                "Reached MAX_BIND_DIRS ({MAX_MOUNT_TARGETS})"
            )));
        }
        let target = MountTarget::new(target)?;
        if self.mounts.contains(&target) {
            return Err(JobTmpError::invalid_config(format!(
                "mount= target given twice: ({target})"
            )));
        }
        self.mounts.push(target);
        Ok(())
    }

    /// Returns the base path template.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the configured mount targets in bind order.
    #[must_use]
    pub fn mounts(&self) -> &[MountTarget] {
        &self.mounts
    }
}
