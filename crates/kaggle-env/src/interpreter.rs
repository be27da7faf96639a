//! Interpreter discovery.
//!
//! Candidates are tried in the order given by [`ShellKind::interpreter_candidates`].
//! The first one that runs and reports the required `major.minor` version is
//! selected and threaded through the rest of the run.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{ProvisionError, ProvisionResult};
use crate::progress::{ProgressHandler, ProvisionPhase};
use crate::shell::ShellKind;
use crate::toolchain::Toolchain;

/// A way of invoking an interpreter: a program plus leading arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterCandidate {
    pub program: String,
    pub args: Vec<String>,
}

impl InterpreterCandidate {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for InterpreterCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// The selected interpreter and the version string it reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interpreter {
    pub candidate: InterpreterCandidate,
    pub version: String,
}

/// Check whether a `--version` output names the required `major.minor`.
///
/// `"3.12"` matches `Python 3.12.4` and `Python 3.12` but not `Python 3.1`,
/// `Python 3.120` or `Python 2.7.18`.
pub fn reports_version(output: &str, required: &str) -> bool {
    let required = required.trim();
    if required.is_empty() {
        return false;
    }
    output.split_whitespace().any(|token| {
        let token = token.trim_start_matches(|c: char| !c.is_ascii_digit());
        token == required
            || token
                .strip_prefix(required)
                .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('+'))
    })
}

/// Find the first candidate that reports the required version.
///
/// Fails with [`ProvisionError::InterpreterNotFound`] when none does. Nothing
/// on disk is touched by this step.
pub async fn discover_interpreter(
    toolchain: &dyn Toolchain,
    shell: ShellKind,
    required_version: &str,
    handler: &dyn ProgressHandler,
) -> ProvisionResult<Interpreter> {
    handler.on_progress(ProvisionPhase::DiscoveringInterpreter {
        version: required_version.to_string(),
    });

    let candidates = shell.interpreter_candidates(required_version);
    for candidate in &candidates {
        let Some(output) = toolchain.interpreter_version(candidate).await else {
            debug!("[interpreter] {candidate} is not available");
            continue;
        };
        let output = output.trim().to_string();
        if reports_version(&output, required_version) {
            info!("[interpreter] Selected {candidate} ({output})");
            handler.on_progress(ProvisionPhase::InterpreterFound {
                command: candidate.to_string(),
                version: output.clone(),
            });
            return Ok(Interpreter {
                candidate: candidate.clone(),
                version: output,
            });
        }
        debug!("[interpreter] {candidate} reported '{output}', need {required_version}");
    }

    Err(ProvisionError::InterpreterNotFound {
        version: required_version.to_string(),
        tried: candidates.iter().map(|c| c.to_string()).collect(),
    })
}
