//! The capability interface behind which every external process lives.
//!
//! [`Toolchain`] is what the provisioning steps call; [`ProcessToolchain`]
//! implements it with real child processes (`python -m venv`,
//! `python -m pip`, `python -m ipykernel`). Child processes of an environment
//! run with `VIRTUAL_ENV` set and the environment's script directory first on
//! `PATH`; the parent process environment is left alone.

use async_trait::async_trait;
use log::debug;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::environment::Environment;
use crate::error::{ProvisionError, ProvisionResult};
use crate::interpreter::{Interpreter, InterpreterCandidate};
use crate::kernel::KernelSpec;

/// External operations the provisioner depends on.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Run `candidate --version` and return what it printed, or `None` if it
    /// could not be run or exited unsuccessfully.
    async fn interpreter_version(&self, candidate: &InterpreterCandidate) -> Option<String>;

    /// Create a virtual environment at `env_root` with `interpreter`.
    async fn create_environment(
        &self,
        interpreter: &Interpreter,
        env_root: &Path,
    ) -> ProvisionResult<()>;

    /// Upgrade the package installer inside `env`.
    async fn upgrade_installer(&self, env: &Environment) -> ProvisionResult<()>;

    /// Install exactly the specifiers listed in `lock_file`.
    async fn install_lock_file(&self, env: &Environment, lock_file: &Path) -> ProvisionResult<()>;

    /// Install the named packages.
    async fn install_packages(&self, env: &Environment, packages: &[String])
        -> ProvisionResult<()>;

    /// Everything installed in `env`, one pinned specifier per line.
    async fn freeze(&self, env: &Environment) -> ProvisionResult<String>;

    /// Whether `module` imports in `env`.
    async fn can_import(&self, env: &Environment, module: &str) -> bool;

    /// Register `kernel` for the current user.
    async fn register_kernel(&self, env: &Environment, kernel: &KernelSpec) -> ProvisionResult<()>;
}

/// [`Toolchain`] backed by real child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessToolchain {
    /// Capture installer output instead of streaming it to the terminal.
    pub quiet: bool,
}

impl ProcessToolchain {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// A command running `env`'s interpreter as if the environment were
    /// activated.
    fn python(&self, env: &Environment) -> Command {
        let mut cmd = Command::new(&env.python_path);
        cmd.env("VIRTUAL_ENV", &env.root);
        cmd.env_remove("PYTHONHOME");

        let mut paths = vec![env.scripts_dir.clone()];
        if let Some(current) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&current));
        }
        if let Ok(joined) = std::env::join_paths(paths) {
            cmd.env("PATH", joined);
        }
        cmd
    }

    /// Run a long step (venv creation, installs). Output is streamed unless
    /// `quiet`; failure carries captured stderr or the exit status.
    async fn run_step(&self, mut cmd: Command) -> Result<(), String> {
        let line = describe(&cmd);
        debug!("[toolchain] Running {line}");

        if self.quiet {
            let output = cmd
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .await
                .map_err(|e| format!("could not run `{line}`: {e}"))?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(format!("`{line}` failed: {}", stderr.trim()));
            }
        } else {
            let status = cmd
                .stdin(Stdio::null())
                .status()
                .await
                .map_err(|e| format!("could not run `{line}`: {e}"))?;
            if !status.success() {
                return Err(format!("`{line}` exited with {status}"));
            }
        }
        Ok(())
    }

    /// Run a short probe and capture its output.
    async fn capture(&self, mut cmd: Command) -> Result<String, String> {
        let line = describe(&cmd);
        debug!("[toolchain] Running {line}");

        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| format!("could not run `{line}`: {e}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("`{line}` failed: {}", stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl Toolchain for ProcessToolchain {
    async fn interpreter_version(&self, candidate: &InterpreterCandidate) -> Option<String> {
        let output = Command::new(&candidate.program)
            .args(&candidate.args)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        // Python 2 prints its version on stderr.
        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Some(text)
    }

    async fn create_environment(
        &self,
        interpreter: &Interpreter,
        env_root: &Path,
    ) -> ProvisionResult<()> {
        let mut cmd = Command::new(&interpreter.candidate.program);
        cmd.args(&interpreter.candidate.args)
            .args(["-m", "venv"])
            .arg(env_root);
        self.run_step(cmd)
            .await
            .map_err(|message| ProvisionError::EnvironmentCreation {
                path: env_root.to_path_buf(),
                message,
            })
    }

    async fn upgrade_installer(&self, env: &Environment) -> ProvisionResult<()> {
        let mut cmd = self.python(env);
        cmd.args(["-m", "pip", "install", "--upgrade", "pip"]);
        self.run_step(cmd).await.map_err(ProvisionError::Install)
    }

    async fn install_lock_file(&self, env: &Environment, lock_file: &Path) -> ProvisionResult<()> {
        let mut cmd = self.python(env);
        cmd.args(["-m", "pip", "install", "-r"]).arg(lock_file);
        self.run_step(cmd).await.map_err(ProvisionError::Install)
    }

    async fn install_packages(
        &self,
        env: &Environment,
        packages: &[String],
    ) -> ProvisionResult<()> {
        if packages.is_empty() {
            return Ok(());
        }
        let mut cmd = self.python(env);
        cmd.args(["-m", "pip", "install"]).args(packages);
        self.run_step(cmd).await.map_err(ProvisionError::Install)
    }

    async fn freeze(&self, env: &Environment) -> ProvisionResult<String> {
        let mut cmd = self.python(env);
        cmd.args(["-m", "pip", "freeze"]);
        self.capture(cmd).await.map_err(ProvisionError::Freeze)
    }

    async fn can_import(&self, env: &Environment, module: &str) -> bool {
        let mut cmd = self.python(env);
        cmd.arg("-c").arg(format!("import {module}"));
        match self.capture(cmd).await {
            Ok(_) => true,
            Err(e) => {
                debug!("[toolchain] import {module} failed: {e}");
                false
            }
        }
    }

    async fn register_kernel(&self, env: &Environment, kernel: &KernelSpec) -> ProvisionResult<()> {
        let mut cmd = self.python(env);
        cmd.args(["-m", "ipykernel", "install", "--user", "--name"])
            .arg(&kernel.name)
            .arg("--display-name")
            .arg(&kernel.display_name);
        self.capture(cmd)
            .await
            .map(|_| ())
            .map_err(ProvisionError::KernelRegistration)
    }
}

/// Render a command line for logs and error messages.
fn describe(cmd: &Command) -> String {
    let std_cmd = cmd.as_std();
    let mut parts: Vec<OsString> = vec![std_cmd.get_program().to_os_string()];
    parts.extend(std_cmd.get_args().map(|a| a.to_os_string()));
    parts
        .iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
