//! The end-to-end provisioning procedure.
//!
//! Steps run strictly in order, each awaiting its child processes:
//!
//! 1. working-directory check (advisory)
//! 2. interpreter discovery
//! 3. environment create / reuse / recreate
//! 4. dependency installation (lock file, or defaults + freeze)
//! 5. smoke-test verification (advisory)
//! 6. kernel registration (advisory, optional)
//! 7. activation helper (written once)
//!
//! A fatal error stops the run where it happened; nothing already done is
//! rolled back.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::activation::{write_activation_helper, HelperSpec, HelperStatus};
use crate::config::ProvisionConfig;
use crate::environment::{ensure_environment, Environment, EnvironmentAction};
use crate::error::{ProvisionError, ProvisionResult};
use crate::interpreter::{discover_interpreter, Interpreter};
use crate::kernel::{register_kernel, KernelStatus};
use crate::manifest::{install_dependencies, ManifestSource};
use crate::progress::{ProgressHandler, ProvisionPhase};
use crate::project::recognize_project;
use crate::prompt::Prompter;
use crate::toolchain::Toolchain;
use crate::verify::{verify, VerificationReport};

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionOutcome {
    pub interpreter: Interpreter,
    pub environment: Environment,
    pub environment_action: EnvironmentAction,
    pub manifest: ManifestSource,
    pub verification: VerificationReport,
    pub kernel: KernelStatus,
    pub helper: HelperStatus,
}

/// Drives a provisioning run for one project.
pub struct Provisioner<'a> {
    config: ProvisionConfig,
    toolchain: &'a dyn Toolchain,
    prompter: &'a dyn Prompter,
    handler: Arc<dyn ProgressHandler>,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        config: ProvisionConfig,
        toolchain: &'a dyn Toolchain,
        prompter: &'a dyn Prompter,
        handler: Arc<dyn ProgressHandler>,
    ) -> Self {
        Self {
            config,
            toolchain,
            prompter,
            handler,
        }
    }

    /// Run every step. Fatal errors are reported as an
    /// [`ProvisionPhase::Error`] event before being returned.
    pub async fn run(&self) -> ProvisionResult<ProvisionOutcome> {
        match self.run_steps().await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.handler.on_progress(ProvisionPhase::Error {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_steps(&self) -> ProvisionResult<ProvisionOutcome> {
        let handler = self.handler.as_ref();
        let config = &self.config;

        handler.on_progress(ProvisionPhase::Starting {
            project_dir: config.project_dir.to_string_lossy().to_string(),
        });

        self.check_project_dir()?;

        let interpreter = discover_interpreter(
            self.toolchain,
            config.shell,
            &config.python_version,
            handler,
        )
        .await?;

        let env_root = config.env_root();
        let recreate = self.should_recreate();
        let (environment, environment_action) = ensure_environment(
            self.toolchain,
            &interpreter,
            &env_root,
            config.shell,
            recreate,
            handler,
        )
        .await?;

        let manifest = install_dependencies(
            self.toolchain,
            &environment,
            &config.lock_file_path(),
            &config.default_packages,
            handler,
        )
        .await?;

        let verification = verify(self.toolchain, &environment, &config.smoke_tests, handler).await;

        let kernel = match &config.kernel {
            Some(spec) => register_kernel(self.toolchain, &environment, spec, handler).await,
            None => {
                debug!("[provision] Kernel registration disabled");
                KernelStatus::Skipped
            }
        };

        let kernel_label = match (&kernel, &config.kernel) {
            (KernelStatus::Registered { .. }, Some(spec)) => Some(spec.display_name.as_str()),
            _ => None,
        };
        let helper = write_activation_helper(
            &config.project_dir,
            &HelperSpec {
                shell: config.shell,
                env_dir: &config.env_dir,
                lock_file: &config.lock_file,
                kernel_label,
            },
            handler,
        )
        .await?;

        info!("[provision] Environment ready at {:?}", environment.root);
        handler.on_progress(ProvisionPhase::Ready {
            env_path: environment.root.to_string_lossy().to_string(),
            python_path: environment.python_path.to_string_lossy().to_string(),
        });

        Ok(ProvisionOutcome {
            interpreter,
            environment,
            environment_action,
            manifest,
            verification,
            kernel,
            helper,
        })
    }

    /// Advisory check that the run happens in a project root.
    ///
    /// Unrecognized directories continue with `assume_yes`, otherwise only
    /// after an explicit "yes" (the default is to abort).
    pub fn check_project_dir(&self) -> ProvisionResult<()> {
        let config = &self.config;
        if let Some(found) = recognize_project(
            &config.project_dir,
            &config.project_marker,
            &config.entry_points,
        ) {
            debug!("[provision] Project recognized: {found:?}");
            return Ok(());
        }

        let message = format!(
            "{} does not look like a project directory (name does not contain '{}', no {} found)",
            config.project_dir.display(),
            config.project_marker,
            config
                .entry_points
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" or "),
        );

        if config.assume_yes {
            self.handler
                .on_progress(ProvisionPhase::Warning { message });
            return Ok(());
        }

        if self
            .prompter
            .confirm(&format!("{message}. Continue anyway?"), false)
        {
            Ok(())
        } else {
            Err(ProvisionError::Aborted(
                "declined to continue outside a project directory".to_string(),
            ))
        }
    }

    /// Decide whether an existing environment is deleted and recreated.
    ///
    /// An explicit decision wins; `assume_yes` takes the default ("reuse");
    /// otherwise the prompter is asked with "no" as the default.
    fn should_recreate(&self) -> bool {
        let env_root = self.config.env_root();
        if !env_root.is_dir() {
            return false;
        }
        if let Some(decision) = self.config.recreate {
            return decision;
        }
        if self.config.assume_yes {
            return false;
        }
        self.prompter.confirm(
            &format!(
                "An environment already exists at {}. Delete it and create a fresh one?",
                env_root.display()
            ),
            false,
        )
    }
}
