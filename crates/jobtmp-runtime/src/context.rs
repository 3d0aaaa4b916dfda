//! Per-process plugin state and the scheduler-facing entry points.
//!
//! A scheduler loads the plugin into several independent processes during a
//! job's life (node agent, launch client, task processes) and calls one or
//! more entry points in each. Every process owns exactly one [`PrivateTmp`];
//! nothing is shared across processes, so each stage below runs at most
//! once per process:
//!
//! | Stage | Retried after failure |
//! |---|---|
//! | option parsing | yes |
//! | identity + path derivation | yes |
//! | directory provisioning | yes |
//! | namespace + binds | no, later calls report the first failure |

use std::path::PathBuf;

use jobtmp_common::config::PluginConfig;
use jobtmp_common::constants::PLUGIN_NAME;
use jobtmp_common::error::{JobTmpError, Result};
use jobtmp_common::types::MountStep;
use jobtmp_core::backend::{IsolationBackend, LinuxBackend};

use crate::isolate::isolate;
use crate::job::{JobIdentity, JobSource};
use crate::paths::DerivedPaths;
use crate::provision::provision;

#[derive(Debug)]
enum NamespaceState {
    Unbound,
    Bound,
    Failed {
        step: MountStep,
        path: PathBuf,
        reason: String,
    },
}

/// Idempotency state for one process.
#[derive(Debug)]
pub struct PrivateTmp<B: IsolationBackend = LinuxBackend> {
    backend: B,
    config: Option<PluginConfig>,
    identity: Option<JobIdentity>,
    paths: Option<DerivedPaths>,
    provisioned: bool,
    namespace: NamespaceState,
}

impl PrivateTmp<LinuxBackend> {
    /// Creates a context that issues real syscalls.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_backend(LinuxBackend::new())
    }
}

impl Default for PrivateTmp<LinuxBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: IsolationBackend> PrivateTmp<B> {
    /// Creates a context driving the given backend.
    pub const fn with_backend(backend: B) -> Self {
        Self {
            backend,
            config: None,
            identity: None,
            paths: None,
            provisioned: false,
            namespace: NamespaceState::Unbound,
        }
    }

    /// Plugin initialization: parses the options.
    ///
    /// # Errors
    ///
    /// Returns [`JobTmpError::InvalidConfig`] if the options are malformed.
    pub fn initialize<S: AsRef<str>>(&mut self, args: &[S]) -> Result<()> {
        self.ensure_config(args)
            .map(|_| ())
            .inspect_err(|e| report("init", e))
    }

    /// Job setup in the node agent's privileged prolog.
    ///
    /// Derives the paths, creates the private directories, and then binds
    /// them in this process if it is a remote execution context.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any stage; the job launch must be denied.
    pub fn job_setup<S: AsRef<str>>(&mut self, job: &dyn JobSource, args: &[S]) -> Result<()> {
        self.setup(job, args).inspect_err(|e| report("job_prolog", e))
    }

    /// Runs after the scheduler has processed options in this process.
    ///
    /// Binds the private directories if this is a remote execution context
    /// and they are not bound yet.
    ///
    /// # Errors
    ///
    /// Returns the first failure of path derivation or the mount sequence.
    pub fn post_option_processing<S: AsRef<str>>(
        &mut self,
        job: &dyn JobSource,
        args: &[S],
    ) -> Result<()> {
        self.bind(job, args)
            .inspect_err(|e| report("init_post_opt", e))
    }

    /// Runs when the launch client sets up the local user session.
    ///
    /// Same contract as [`post_option_processing`](Self::post_option_processing).
    ///
    /// # Errors
    ///
    /// Returns the first failure of path derivation or the mount sequence.
    pub fn local_user_session_init<S: AsRef<str>>(
        &mut self,
        job: &dyn JobSource,
        args: &[S],
    ) -> Result<()> {
        self.bind(job, args)
            .inspect_err(|e| report("local_user_init", e))
    }

    /// Parsed configuration, once option parsing has succeeded.
    pub const fn config(&self) -> Option<&PluginConfig> {
        self.config.as_ref()
    }

    /// Resolved job identity, once path derivation has succeeded.
    pub const fn identity(&self) -> Option<&JobIdentity> {
        self.identity.as_ref()
    }

    /// Derived paths, once path derivation has succeeded.
    pub const fn paths(&self) -> Option<&DerivedPaths> {
        self.paths.as_ref()
    }

    /// Whether this process already runs in its private mount namespace.
    pub const fn is_bound(&self) -> bool {
        matches!(self.namespace, NamespaceState::Bound)
    }

    /// The backend this context drives.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    fn setup<S: AsRef<str>>(&mut self, job: &dyn JobSource, args: &[S]) -> Result<()> {
        self.ensure_paths(job, args)?;
        if !self.provisioned {
            if let (Some(paths), Some(identity)) = (&self.paths, &self.identity) {
                provision(&self.backend, paths, identity)?;
                self.provisioned = true;
            }
        }
        self.bind(job, args)
    }

    fn bind<S: AsRef<str>>(&mut self, job: &dyn JobSource, args: &[S]) -> Result<()> {
        if !job.is_remote() {
            tracing::trace!("not a remote execution context, skipping bind");
            return Ok(());
        }
        match &self.namespace {
            NamespaceState::Bound => return Ok(()),
            NamespaceState::Failed { step, path, reason } => {
                return Err(JobTmpError::NamespaceSetupFailed {
                    step: *step,
                    path: path.clone(),
                    source: std::io::Error::other(format!("earlier attempt failed: {reason}")),
                });
            }
            NamespaceState::Unbound => {}
        }
        self.ensure_paths(job, args)?;
        let (Some(paths), Some(identity)) = (&self.paths, &self.identity) else {
            return Ok(());
        };
        match isolate(&self.backend, paths, identity.job_id) {
            Ok(()) => {
                self.namespace = NamespaceState::Bound;
                Ok(())
            }
            Err(err) => {
                if let JobTmpError::NamespaceSetupFailed { step, path, source } = &err {
                    self.namespace = NamespaceState::Failed {
                        step: *step,
                        path: path.clone(),
                        reason: source.to_string(),
                    };
                }
                Err(err)
            }
        }
    }

    fn ensure_config<S: AsRef<str>>(&mut self, args: &[S]) -> Result<&PluginConfig> {
        let config = match self.config.take() {
            Some(config) => config,
            None => PluginConfig::from_args(args)?,
        };
        Ok(self.config.insert(config))
    }

    fn ensure_paths<S: AsRef<str>>(&mut self, job: &dyn JobSource, args: &[S]) -> Result<()> {
        if self.paths.is_some() {
            return Ok(());
        }
        let config = self.ensure_config(args)?.clone();
        let identity = JobIdentity::resolve(job)?;
        let paths = DerivedPaths::derive(&config, &identity)?;
        tracing::debug!(
            job_id = identity.job_id,
            base = %paths.private_base.display(),
            "derived private paths"
        );
        self.identity = Some(identity);
        self.paths = Some(paths);
        Ok(())
    }
}

fn report(hook: &'static str, err: &JobTmpError) {
    tracing::error!(plugin = PLUGIN_NAME, hook, error = %err, "lifecycle call failed");
}
