//! Provisioning configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::kernel::KernelSpec;
use crate::manifest::default_packages;
use crate::shell::ShellKind;
use crate::verify::{default_smoke_tests, SmokeTest};

/// Python `major.minor` the environment is built with.
pub const DEFAULT_PYTHON_VERSION: &str = "3.12";

/// Environment directory, relative to the project root.
pub const DEFAULT_ENV_DIR: &str = ".venv";

/// Lock file, relative to the project root.
pub const DEFAULT_LOCK_FILE: &str = "requirements.txt";

/// Substring expected in the project directory's name.
pub const DEFAULT_PROJECT_MARKER: &str = "kaggle";

/// Everything a provisioning run needs to know.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Project root; the environment, lock file and helper live here.
    pub project_dir: PathBuf,
    /// Environment directory relative to `project_dir`.
    pub env_dir: String,
    /// Lock file relative to `project_dir`.
    pub lock_file: String,
    /// Required interpreter `major.minor`.
    pub python_version: String,
    /// Shell family to generate artifacts for.
    pub shell: ShellKind,
    /// Packages installed when no lock file exists.
    pub default_packages: Vec<String>,
    /// Imports probed after installation.
    pub smoke_tests: Vec<SmokeTest>,
    /// Kernel to register; `None` skips registration.
    pub kernel: Option<KernelSpec>,
    /// Directory-name marker for the working-directory check.
    pub project_marker: String,
    /// Entry-point files (relative to `project_dir`) for the working-directory check.
    pub entry_points: Vec<PathBuf>,
    /// Pre-decided answer to "recreate the existing environment?"; `None` asks.
    pub recreate: Option<bool>,
    /// Skip confirmation prompts, taking each question's default answer
    /// (except the working-directory check, which continues).
    pub assume_yes: bool,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            project_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_dir: DEFAULT_ENV_DIR.to_string(),
            lock_file: DEFAULT_LOCK_FILE.to_string(),
            python_version: DEFAULT_PYTHON_VERSION.to_string(),
            shell: ShellKind::detect(),
            default_packages: default_packages(),
            smoke_tests: default_smoke_tests(),
            kernel: Some(KernelSpec::for_version(DEFAULT_PYTHON_VERSION)),
            project_marker: DEFAULT_PROJECT_MARKER.to_string(),
            entry_points: vec![PathBuf::from("src").join("__init__.py")],
            recreate: None,
            assume_yes: false,
        }
    }
}

impl ProvisionConfig {
    /// Defaults rooted at `project_dir`.
    pub fn for_project(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Default::default()
        }
    }

    /// Absolute path of the environment root.
    pub fn env_root(&self) -> PathBuf {
        self.project_dir.join(&self.env_dir)
    }

    /// Absolute path of the lock file.
    pub fn lock_file_path(&self) -> PathBuf {
        self.project_dir.join(&self.lock_file)
    }
}
