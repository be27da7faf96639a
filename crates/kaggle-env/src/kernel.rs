//! Notebook kernel registration.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::progress::{ProgressHandler, ProvisionPhase};
use crate::toolchain::Toolchain;

/// Identity of the Jupyter kernel registered for the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelSpec {
    /// Internal kernel name (directory name under the user's kernels dir).
    pub name: String,
    /// Label shown in the notebook UI's kernel picker.
    pub display_name: String,
}

impl KernelSpec {
    /// Default kernel identity for a `major.minor` Python version.
    pub fn for_version(version: &str) -> Self {
        Self {
            name: format!("kaggle-py{}", version.replace('.', "")),
            display_name: format!("Python {version} (Kaggle)"),
        }
    }
}

/// Outcome of the kernel registration step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KernelStatus {
    Registered { name: String },
    Skipped,
    Failed { message: String },
}

/// Register `kernel` for `env`.
///
/// Never fails the run: a registration error becomes
/// [`KernelStatus::Failed`] plus a warning event.
pub async fn register_kernel(
    toolchain: &dyn Toolchain,
    env: &Environment,
    kernel: &KernelSpec,
    handler: &dyn ProgressHandler,
) -> KernelStatus {
    handler.on_progress(ProvisionPhase::RegisteringKernel {
        name: kernel.name.clone(),
        display_name: kernel.display_name.clone(),
    });

    match toolchain.register_kernel(env, kernel).await {
        Ok(()) => {
            info!("[kernel] Registered {} ({})", kernel.name, kernel.display_name);
            handler.on_progress(ProvisionPhase::KernelRegistered {
                name: kernel.name.clone(),
            });
            KernelStatus::Registered {
                name: kernel.name.clone(),
            }
        }
        Err(e) => {
            let message = e.to_string();
            warn!("[kernel] {message}");
            handler.on_progress(ProvisionPhase::Warning {
                message: format!("{message} (continuing without a registered kernel)"),
            });
            KernelStatus::Failed { message }
        }
    }
}
