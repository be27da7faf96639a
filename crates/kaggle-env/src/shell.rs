//! Host shell knowledge.
//!
//! Everything that differs between the POSIX shell, Windows `cmd` and
//! PowerShell lives here: interpreter candidate order, the layout of a
//! virtual environment on disk, and the activation helper each shell runs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::interpreter::InterpreterCandidate;

/// The shell family the provisioner is generating artifacts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    /// bash/zsh/sh on Unix-like hosts.
    Posix,
    /// Windows `cmd.exe`.
    Cmd,
    /// Windows PowerShell or pwsh.
    PowerShell,
}

impl Default for ShellKind {
    fn default() -> Self {
        Self::detect()
    }
}

impl std::fmt::Display for ShellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellKind::Posix => write!(f, "posix"),
            ShellKind::Cmd => write!(f, "cmd"),
            ShellKind::PowerShell => write!(f, "powershell"),
        }
    }
}

impl FromStr for ShellKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "posix" | "sh" | "bash" | "zsh" => Ok(ShellKind::Posix),
            "cmd" | "bat" | "batch" => Ok(ShellKind::Cmd),
            "powershell" | "pwsh" | "ps1" => Ok(ShellKind::PowerShell),
            other => Err(format!(
                "unknown shell '{other}' (expected posix, cmd or powershell)"
            )),
        }
    }
}

impl ShellKind {
    /// Detect the shell family of the current host.
    ///
    /// Unix hosts are always [`ShellKind::Posix`]. On Windows, PowerShell
    /// sessions export `PSModulePath`; anything else is treated as `cmd`.
    pub fn detect() -> Self {
        if cfg!(windows) {
            if std::env::var_os("PSModulePath").is_some() {
                ShellKind::PowerShell
            } else {
                ShellKind::Cmd
            }
        } else {
            ShellKind::Posix
        }
    }

    /// Whether this shell runs on Windows (and so uses the Windows venv layout).
    pub fn is_windows(&self) -> bool {
        matches!(self, ShellKind::Cmd | ShellKind::PowerShell)
    }

    /// Interpreter candidates in priority order for the given `major.minor`.
    ///
    /// Generic command first, then the `py` launcher (Windows only), then the
    /// version-suffixed command.
    pub fn interpreter_candidates(&self, version: &str) -> Vec<InterpreterCandidate> {
        let mut candidates = Vec::new();
        if self.is_windows() {
            candidates.push(InterpreterCandidate::new("python", &[]));
            candidates.push(InterpreterCandidate::new("py", &[&format!("-{version}")]));
        } else {
            candidates.push(InterpreterCandidate::new("python3", &[]));
        }
        candidates.push(InterpreterCandidate::new(&format!("python{version}"), &[]));
        candidates
    }

    /// Directory inside the environment that holds its executables.
    pub fn scripts_dir(&self, env_root: &Path) -> PathBuf {
        if self.is_windows() {
            env_root.join("Scripts")
        } else {
            env_root.join("bin")
        }
    }

    /// Path of the environment's interpreter.
    pub fn python_path(&self, env_root: &Path) -> PathBuf {
        if self.is_windows() {
            self.scripts_dir(env_root).join("python.exe")
        } else {
            self.scripts_dir(env_root).join("python")
        }
    }

    /// File name of the activation helper generated at the project root.
    pub fn helper_file_name(&self) -> &'static str {
        match self {
            ShellKind::Posix => "activate.sh",
            ShellKind::Cmd => "activate.bat",
            ShellKind::PowerShell => "activate.ps1",
        }
    }

    /// How the helper refers to the environment directory: relative to the
    /// helper's own location, or as given when `env_dir` is absolute.
    fn helper_env_path(&self, env_dir: &str) -> String {
        if Path::new(env_dir).is_absolute() {
            return env_dir.to_string();
        }
        match self {
            ShellKind::Posix => format!("$HELPER_DIR/{env_dir}"),
            ShellKind::Cmd => format!("%~dp0{env_dir}"),
            ShellKind::PowerShell => format!("$PSScriptRoot\\{env_dir}"),
        }
    }

    /// Render the activation helper for the environment directory `env_dir`
    /// and the lock file `lock_file`, plus the registered kernel label if
    /// there is one. A relative `env_dir` is resolved against the helper's
    /// directory.
    pub fn render_helper(
        &self,
        env_dir: &str,
        lock_file: &str,
        kernel_label: Option<&str>,
    ) -> String {
        let env_path = self.helper_env_path(env_dir);
        match self {
            ShellKind::Posix => {
                let kernel_hint = kernel_label
                    .map(|label| format!("echo \"  Notebook kernel: {label}\"\n"))
                    .unwrap_or_default();
                format!(
                    r#"#!/usr/bin/env bash
# Source this file into the current shell: source ./activate.sh
# Running it as a program leaves the calling shell unchanged.
HELPER_DIR="$(cd "$(dirname "${{BASH_SOURCE[0]:-$0}}")" && pwd)"
source "{env_path}/bin/activate"

echo "Environment: $VIRTUAL_ENV"
echo "Python: $(python --version 2>&1)"
echo "pip: $(pip --version)"
echo ""
echo "Commands:"
echo "  jupyter lab      start JupyterLab"
echo "  pip freeze > {lock_file}   refresh the lock file"
echo "  deactivate       leave the environment"
{kernel_hint}"#
                )
            }
            ShellKind::Cmd => {
                let kernel_hint = kernel_label
                    .map(|label| format!("echo   Notebook kernel: {label}\r\n"))
                    .unwrap_or_default();
                format!(
                    "@echo off\r\n\
                     rem Usage: activate.bat\r\n\
                     call \"{env_path}\\Scripts\\activate.bat\"\r\n\
                     \r\n\
                     echo Environment: %VIRTUAL_ENV%\r\n\
                     python --version\r\n\
                     pip --version\r\n\
                     echo.\r\n\
                     echo Commands:\r\n\
                     echo   jupyter lab      start JupyterLab\r\n\
                     echo   pip freeze ^> {lock_file}   refresh the lock file\r\n\
                     echo   deactivate       leave the environment\r\n\
                     {kernel_hint}"
                )
            }
            ShellKind::PowerShell => {
                let kernel_hint = kernel_label
                    .map(|label| format!("Write-Host \"  Notebook kernel: {label}\"\r\n"))
                    .unwrap_or_default();
                format!(
                    "# Usage: . .\\activate.ps1\r\n\
                     & \"{env_path}\\Scripts\\Activate.ps1\"\r\n\
                     \r\n\
                     Write-Host \"Environment: $env:VIRTUAL_ENV\"\r\n\
                     Write-Host \"Python: $(python --version)\"\r\n\
                     Write-Host \"pip: $(pip --version)\"\r\n\
                     Write-Host \"\"\r\n\
                     Write-Host \"Commands:\"\r\n\
                     Write-Host \"  jupyter lab      start JupyterLab\"\r\n\
                     Write-Host \"  pip freeze > {lock_file}   refresh the lock file\"\r\n\
                     Write-Host \"  deactivate       leave the environment\"\r\n\
                     {kernel_hint}"
                )
            }
        }
    }
}
