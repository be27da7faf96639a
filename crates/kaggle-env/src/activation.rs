//! Activation helper generation.
//!
//! The helper is written once. An existing file is never overwritten, even
//! when the content generated now would differ.

use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ProvisionResult;
use crate::progress::{ProgressHandler, ProvisionPhase};
use crate::shell::ShellKind;

/// What [`write_activation_helper`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HelperStatus {
    Created { path: PathBuf },
    Kept { path: PathBuf },
}

impl HelperStatus {
    pub fn path(&self) -> &Path {
        match self {
            HelperStatus::Created { path } | HelperStatus::Kept { path } => path,
        }
    }
}

/// Inputs to the helper template.
#[derive(Debug, Clone)]
pub struct HelperSpec<'a> {
    pub shell: ShellKind,
    /// Environment directory, relative to the project root or absolute.
    pub env_dir: &'a str,
    /// Lock file name relative to the project root.
    pub lock_file: &'a str,
    /// Label of the registered kernel, if any.
    pub kernel_label: Option<&'a str>,
}

/// Write the shell-appropriate activation helper into `project_dir` unless
/// one already exists.
pub async fn write_activation_helper(
    project_dir: &Path,
    spec: &HelperSpec<'_>,
    handler: &dyn ProgressHandler,
) -> ProvisionResult<HelperStatus> {
    let path = project_dir.join(spec.shell.helper_file_name());

    if path.exists() {
        info!("[helper] Keeping existing {:?}", path);
        handler.on_progress(ProvisionPhase::HelperKept {
            path: path.to_string_lossy().to_string(),
        });
        return Ok(HelperStatus::Kept { path });
    }

    let content = spec
        .shell
        .render_helper(spec.env_dir, spec.lock_file, spec.kernel_label);
    // Sourced, not executed, so no execute bit.
    tokio::fs::write(&path, content).await?;

    info!("[helper] Created {:?}", path);
    handler.on_progress(ProvisionPhase::HelperWritten {
        path: path.to_string_lossy().to_string(),
    });
    Ok(HelperStatus::Created { path })
}
