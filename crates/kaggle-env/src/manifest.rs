//! Package manifests and dependency installation.
//!
//! A lock file at the project root takes precedence over the built-in
//! default set. When there is no lock file, the defaults are installed and
//! the resolved environment (`pip freeze`) becomes the lock file, so the
//! default set is used at most once per project unless the file is removed.

use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::environment::Environment;
use crate::error::{ProvisionError, ProvisionResult};
use crate::progress::{ProgressHandler, ProvisionPhase};
use crate::toolchain::Toolchain;

/// Top-level packages installed when a project has no lock file yet.
pub const DEFAULT_PACKAGES: &[&str] = &[
    // core scientific stack
    "numpy",
    "pandas",
    "scipy",
    "pyarrow",
    "polars",
    // visualization
    "matplotlib",
    "seaborn",
    "plotly",
    // machine learning
    "scikit-learn",
    "xgboost",
    "lightgbm",
    "catboost",
    "statsmodels",
    "imbalanced-learn",
    "category_encoders",
    "optuna",
    "shap",
    "joblib",
    // notebooks
    "jupyterlab",
    "notebook",
    "ipykernel",
    "ipywidgets",
    // tooling
    "kaggle",
    "tqdm",
    "python-dotenv",
    "pyyaml",
    "black",
    "pytest",
];

/// The built-in default package set as owned strings.
pub fn default_packages() -> Vec<String> {
    DEFAULT_PACKAGES.iter().map(|p| p.to_string()).collect()
}

/// Where the packages for this run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageManifest {
    /// An existing lock file; its specifiers in file order.
    LockFile { path: PathBuf, entries: Vec<String> },
    /// No lock file; the unpinned default set.
    Defaults(Vec<String>),
}

impl PackageManifest {
    /// Pick the manifest for a project: the lock file if it exists, else
    /// `defaults`. The two are never merged.
    pub fn load(lock_file: &Path, defaults: &[String]) -> std::io::Result<Self> {
        if lock_file.is_file() {
            let contents = std::fs::read_to_string(lock_file)?;
            Ok(PackageManifest::LockFile {
                path: lock_file.to_path_buf(),
                entries: lock_file_entries(&contents),
            })
        } else {
            Ok(PackageManifest::Defaults(defaults.to_vec()))
        }
    }
}

/// The specifier lines of a lock file, in order.
///
/// Blank lines and `#` comments are skipped.
pub fn lock_file_entries(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// What [`install_dependencies`] installed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ManifestSource {
    /// Installed exactly what an existing lock file lists.
    LockFile { path: PathBuf, entries: usize },
    /// Installed the default set and froze the result into a new lock file.
    Defaults {
        packages: usize,
        lock_file: PathBuf,
        pinned: usize,
    },
}

/// Install the project's dependencies into `env`.
///
/// Upgrades pip first, then installs from `lock_file` when present, or from
/// `defaults` followed by writing `pip freeze` output to `lock_file`. Any
/// failure is fatal and leaves the environment as it is.
pub async fn install_dependencies(
    toolchain: &dyn Toolchain,
    env: &Environment,
    lock_file: &Path,
    defaults: &[String],
    handler: &dyn ProgressHandler,
) -> ProvisionResult<ManifestSource> {
    let manifest = PackageManifest::load(lock_file, defaults)?;

    handler.on_progress(ProvisionPhase::UpgradingInstaller);
    toolchain.upgrade_installer(env).await?;

    match manifest {
        PackageManifest::LockFile { path, entries } => {
            info!(
                "[manifest] Installing {} entries from {:?}",
                entries.len(),
                path
            );
            handler.on_progress(ProvisionPhase::InstallingFromLockFile {
                lock_file: path.to_string_lossy().to_string(),
            });
            toolchain.install_lock_file(env, &path).await?;
            Ok(ManifestSource::LockFile {
                path,
                entries: entries.len(),
            })
        }
        PackageManifest::Defaults(packages) => {
            info!("[manifest] No lock file, installing {} defaults", packages.len());
            handler.on_progress(ProvisionPhase::InstallingPackages {
                packages: packages.clone(),
            });
            toolchain.install_packages(env, &packages).await?;

            let frozen = toolchain.freeze(env).await?;
            let pinned = lock_file_entries(&frozen).len();
            let mut contents = frozen;
            if !contents.is_empty() && !contents.ends_with('\n') {
                contents.push('\n');
            }
            tokio::fs::write(lock_file, contents)
                .await
                .map_err(|e| ProvisionError::Freeze(format!("{}: {e}", lock_file.display())))?;

            info!("[manifest] Wrote {pinned} pinned packages to {:?}", lock_file);
            handler.on_progress(ProvisionPhase::LockFileWritten {
                lock_file: lock_file.to_string_lossy().to_string(),
                package_count: pinned,
            });
            Ok(ManifestSource::Defaults {
                packages: packages.len(),
                lock_file: lock_file.to_path_buf(),
                pinned,
            })
        }
    }
}
