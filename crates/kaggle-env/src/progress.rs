//! Progress reporting for provisioning runs.
//!
//! Provides [`ProvisionPhase`] events covering every step of a run
//! (interpreter discovery, environment creation, installation, verification,
//! kernel registration, helper generation) and a [`ProgressHandler`] trait
//! that consumers implement to route events to their UI layer.

use serde::{Deserialize, Serialize};

/// Progress phases during a provisioning run.
///
/// Serializable so a front end can forward them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ProvisionPhase {
    /// Starting a run in the given project directory.
    Starting { project_dir: String },
    /// Looking for an interpreter of the required version.
    DiscoveringInterpreter { version: String },
    /// An interpreter candidate satisfied the version requirement.
    InterpreterFound { command: String, version: String },
    /// The environment directory exists and is reused as-is.
    ReusingEnvironment { env_path: String },
    /// The existing environment directory is being deleted.
    RemovingEnvironment { env_path: String },
    /// Creating the virtual environment.
    CreatingVenv { env_path: String },
    /// Upgrading pip inside the environment.
    UpgradingInstaller,
    /// Installing exactly what the lock file lists.
    InstallingFromLockFile { lock_file: String },
    /// Installing the built-in default package set.
    InstallingPackages { packages: Vec<String> },
    /// The resolved environment was frozen into a new lock file.
    LockFileWritten {
        lock_file: String,
        package_count: usize,
    },
    /// Running the smoke-test imports.
    Verifying { total: usize },
    /// One smoke-test import finished.
    ImportChecked {
        package: String,
        module: String,
        passed: bool,
    },
    /// Registering the notebook kernel.
    RegisteringKernel { name: String, display_name: String },
    /// Kernel registration succeeded.
    KernelRegistered { name: String },
    /// A new activation helper was written.
    HelperWritten { path: String },
    /// An activation helper already existed and was left untouched.
    HelperKept { path: String },
    /// The environment is ready.
    Ready {
        env_path: String,
        python_path: String,
    },
    /// Something went wrong but the run continues.
    Warning { message: String },
    /// A fatal error stopped the run.
    Error { message: String },
}

/// Trait for receiving provisioning progress events.
///
/// Implement this to route progress to your UI layer (terminal output,
/// JSON lines, logs, etc.).
pub trait ProgressHandler: Send + Sync {
    /// Called for each progress phase, in order.
    fn on_progress(&self, phase: ProvisionPhase);
}

/// Log-only progress handler.
///
/// Writes progress phases to the `log` crate.
pub struct LogHandler;

impl ProgressHandler for LogHandler {
    fn on_progress(&self, phase: ProvisionPhase) {
        match &phase {
            ProvisionPhase::Starting { project_dir } => {
                log::info!("[provision] Starting in {project_dir}");
            }
            ProvisionPhase::DiscoveringInterpreter { version } => {
                log::info!("[provision] Looking for Python {version}...");
            }
            ProvisionPhase::InterpreterFound { command, version } => {
                log::info!("[provision] Using `{command}` ({version})");
            }
            ProvisionPhase::ReusingEnvironment { env_path } => {
                log::info!("[provision] Reusing environment at {env_path}");
            }
            ProvisionPhase::RemovingEnvironment { env_path } => {
                log::warn!("[provision] Removing environment at {env_path}");
            }
            ProvisionPhase::CreatingVenv { env_path } => {
                log::info!("[provision] Creating virtual environment at {env_path}...");
            }
            ProvisionPhase::UpgradingInstaller => {
                log::info!("[provision] Upgrading pip...");
            }
            ProvisionPhase::InstallingFromLockFile { lock_file } => {
                log::info!("[provision] Installing from {lock_file}...");
            }
            ProvisionPhase::InstallingPackages { packages } => {
                log::info!("[provision] Installing {} packages: {packages:?}", packages.len());
            }
            ProvisionPhase::LockFileWritten {
                lock_file,
                package_count,
            } => {
                log::info!("[provision] Wrote {package_count} pinned packages to {lock_file}");
            }
            ProvisionPhase::Verifying { total } => {
                log::info!("[provision] Verifying {total} packages...");
            }
            ProvisionPhase::ImportChecked {
                package, passed, ..
            } => {
                if *passed {
                    log::info!("[provision] {package}: ok");
                } else {
                    log::warn!("[provision] {package}: import failed");
                }
            }
            ProvisionPhase::RegisteringKernel { name, display_name } => {
                log::info!("[provision] Registering kernel {name} ({display_name})...");
            }
            ProvisionPhase::KernelRegistered { name } => {
                log::info!("[provision] Kernel {name} registered");
            }
            ProvisionPhase::HelperWritten { path } => {
                log::info!("[provision] Wrote activation helper {path}");
            }
            ProvisionPhase::HelperKept { path } => {
                log::info!("[provision] Keeping existing activation helper {path}");
            }
            ProvisionPhase::Ready {
                env_path,
                python_path,
            } => {
                log::info!("[provision] Ready: env={env_path} python={python_path}");
            }
            ProvisionPhase::Warning { message } => {
                log::warn!("[provision] {message}");
            }
            ProvisionPhase::Error { message } => {
                log::error!("[provision] Error: {message}");
            }
        }
    }
}
