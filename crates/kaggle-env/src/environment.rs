//! Environment creation, reuse and recreation.
//!
//! The environment root directory existing is the only check made: an
//! existing directory is reused as-is unless the caller asked for it to be
//! recreated, in which case it is removed recursively before `venv` runs.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, ProvisionResult};
use crate::interpreter::Interpreter;
use crate::progress::{ProgressHandler, ProvisionPhase};
use crate::shell::ShellKind;
use crate::toolchain::Toolchain;

/// A virtual environment on disk.
///
/// Passing this value around is what "activating" the environment means:
/// every later step runs the environment's own interpreter with
/// `VIRTUAL_ENV` pointing at `root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub root: PathBuf,
    pub scripts_dir: PathBuf,
    pub python_path: PathBuf,
}

impl Environment {
    /// Describe the environment rooted at `root` using `shell`'s layout.
    pub fn at(root: &Path, shell: ShellKind) -> Self {
        Self {
            root: root.to_path_buf(),
            scripts_dir: shell.scripts_dir(root),
            python_path: shell.python_path(root),
        }
    }

    /// Whether the environment root directory exists.
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }
}

/// What [`ensure_environment`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentAction {
    /// No directory existed; a new environment was created.
    Created,
    /// The existing directory was kept without inspection.
    Reused,
    /// The existing directory was deleted and a new environment created.
    Recreated,
}

/// Make sure an environment exists at `env_root`.
///
/// - no directory: create it with `interpreter`
/// - present and `recreate` is false: reuse it untouched
/// - present and `recreate` is true: delete it recursively, then create it
///
/// After creation the root must exist, else
/// [`ProvisionError::EnvironmentMissing`].
pub async fn ensure_environment(
    toolchain: &dyn Toolchain,
    interpreter: &Interpreter,
    env_root: &Path,
    shell: ShellKind,
    recreate: bool,
    handler: &dyn ProgressHandler,
) -> ProvisionResult<(Environment, EnvironmentAction)> {
    let env = Environment::at(env_root, shell);
    let env_path = env_root.to_string_lossy().to_string();

    let action = if env_root.is_dir() {
        if !recreate {
            info!("[environment] Reusing existing environment at {:?}", env_root);
            handler.on_progress(ProvisionPhase::ReusingEnvironment { env_path });
            return Ok((env, EnvironmentAction::Reused));
        }

        warn!("[environment] Removing existing environment at {:?}", env_root);
        handler.on_progress(ProvisionPhase::RemovingEnvironment {
            env_path: env_path.clone(),
        });
        tokio::fs::remove_dir_all(env_root).await?;
        EnvironmentAction::Recreated
    } else {
        EnvironmentAction::Created
    };

    info!("[environment] Creating environment at {:?}", env_root);
    handler.on_progress(ProvisionPhase::CreatingVenv { env_path });

    toolchain.create_environment(interpreter, env_root).await?;

    if !env.exists() {
        return Err(ProvisionError::EnvironmentMissing(env_root.to_path_buf()));
    }

    Ok((env, action))
}
