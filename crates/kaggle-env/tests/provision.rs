//! End-to-end tests for the provisioning procedure.
//!
//! These drive the full [`Provisioner`] against an in-memory toolchain that
//! records every call, so no Python installation is needed.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use kaggle_env::{
    Environment, EnvironmentAction, HelperStatus, Interpreter, InterpreterCandidate, KernelSpec,
    KernelStatus, ManifestSource, ProgressHandler, Prompter, ProvisionConfig, ProvisionError,
    ProvisionOutcome, ProvisionPhase, ProvisionResult, Provisioner, ShellKind, Toolchain,
};
use tempfile::TempDir;

// =============================================================================
// Test doubles
// =============================================================================

/// Toolchain fake: knows a fixed set of interpreters and keeps an in-memory
/// record of installed packages.
#[derive(Default)]
struct FakeToolchain {
    versions: HashMap<String, String>,
    broken_modules: HashSet<String>,
    fail_venv: bool,
    /// `create_environment` reports success without creating anything.
    venv_leaves_no_dir: bool,
    fail_install: bool,
    fail_kernel: bool,
    calls: Mutex<Vec<String>>,
    installed: Mutex<Vec<String>>,
}

impl FakeToolchain {
    fn with_python(candidate: &str, version: &str) -> Self {
        let mut fake = Self::default();
        fake.versions
            .insert(candidate.to_string(), version.to_string());
        fake
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Toolchain for FakeToolchain {
    async fn interpreter_version(&self, candidate: &InterpreterCandidate) -> Option<String> {
        self.record(format!("probe {candidate}"));
        self.versions.get(&candidate.to_string()).cloned()
    }

    async fn create_environment(
        &self,
        interpreter: &Interpreter,
        env_root: &Path,
    ) -> ProvisionResult<()> {
        self.record(format!("venv {} {}", interpreter.candidate, env_root.display()));
        if self.fail_venv {
            return Err(ProvisionError::EnvironmentCreation {
                path: env_root.to_path_buf(),
                message: "Error: Command '-m ensurepip' returned non-zero exit status 1".to_string(),
            });
        }
        if self.venv_leaves_no_dir {
            return Ok(());
        }
        std::fs::create_dir_all(env_root)?;
        std::fs::write(
            env_root.join("pyvenv.cfg"),
            format!("version = {}\n", interpreter.version),
        )?;
        Ok(())
    }

    async fn upgrade_installer(&self, _env: &Environment) -> ProvisionResult<()> {
        self.record("pip install --upgrade pip".to_string());
        Ok(())
    }

    async fn install_lock_file(&self, _env: &Environment, lock_file: &Path) -> ProvisionResult<()> {
        self.record(format!("pip install -r {}", lock_file.display()));
        let contents = std::fs::read_to_string(lock_file)?;
        self.installed
            .lock()
            .unwrap()
            .extend(contents.lines().map(str::to_string));
        Ok(())
    }

    async fn install_packages(
        &self,
        _env: &Environment,
        packages: &[String],
    ) -> ProvisionResult<()> {
        self.record(format!("pip install {}", packages.join(" ")));
        if self.fail_install {
            return Err(ProvisionError::Install(
                "No matching distribution found for catboost".to_string(),
            ));
        }
        self.installed
            .lock()
            .unwrap()
            .extend(packages.iter().cloned());
        Ok(())
    }

    async fn freeze(&self, _env: &Environment) -> ProvisionResult<String> {
        self.record("pip freeze".to_string());
        let mut pinned: Vec<String> = self
            .installed
            .lock()
            .unwrap()
            .iter()
            .map(|p| format!("{p}==1.0.0"))
            .collect();
        // transitive dependencies pulled in by the installer
        pinned.push("python-dateutil==2.9.0".to_string());
        pinned.push("six==1.16.0".to_string());
        pinned.sort();
        Ok(pinned.join("\n"))
    }

    async fn can_import(&self, _env: &Environment, module: &str) -> bool {
        self.record(format!("import {module}"));
        !self.broken_modules.contains(module)
    }

    async fn register_kernel(&self, _env: &Environment, kernel: &KernelSpec) -> ProvisionResult<()> {
        self.record(format!("kernel {}", kernel.name));
        if self.fail_kernel {
            return Err(ProvisionError::KernelRegistration(
                "No module named ipykernel".to_string(),
            ));
        }
        Ok(())
    }
}

/// Collects every progress event.
#[derive(Default)]
struct RecordingHandler {
    phases: Mutex<Vec<ProvisionPhase>>,
}

impl RecordingHandler {
    fn phases(&self) -> Vec<ProvisionPhase> {
        self.phases.lock().unwrap().clone()
    }
}

impl ProgressHandler for RecordingHandler {
    fn on_progress(&self, phase: ProvisionPhase) {
        self.phases.lock().unwrap().push(phase);
    }
}

/// Answers questions from a script, falling back to each question's default.
#[derive(Default)]
struct ScriptedPrompter {
    answers: Mutex<VecDeque<bool>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    fn answering(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            questions: Mutex::new(Vec::new()),
        }
    }

    fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, question: &str, default: bool) -> bool {
        self.questions.lock().unwrap().push(question.to_string());
        self.answers.lock().unwrap().pop_front().unwrap_or(default)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// A project directory whose name carries the project marker.
fn project_dir(temp: &TempDir) -> PathBuf {
    let dir = temp.path().join("titanic-kaggle");
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn config_for(dir: &Path) -> ProvisionConfig {
    ProvisionConfig {
        shell: ShellKind::Posix,
        ..ProvisionConfig::for_project(dir)
    }
}

async fn run(
    config: ProvisionConfig,
    toolchain: &FakeToolchain,
    prompter: &ScriptedPrompter,
) -> (ProvisionResult<ProvisionOutcome>, Arc<RecordingHandler>) {
    let handler = Arc::new(RecordingHandler::default());
    let provisioner = Provisioner::new(config, toolchain, prompter, handler.clone());
    (provisioner.run().await, handler)
}

fn list_dir(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut entries: Vec<(String, Vec<u8>)> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            let bytes = if e.path().is_file() {
                std::fs::read(e.path()).unwrap()
            } else {
                Vec::new()
            };
            (e.file_name().to_string_lossy().to_string(), bytes)
        })
        .collect();
    entries.sort();
    entries
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_first_run_in_empty_project() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let toolchain = FakeToolchain::with_python("python3", "Python 3.12.4");
    let prompter = ScriptedPrompter::default();

    let (result, handler) = run(config_for(&dir), &toolchain, &prompter).await;
    let outcome = result.expect("provisioning should succeed");

    assert_eq!(outcome.interpreter.candidate.to_string(), "python3");
    assert_eq!(outcome.environment_action, EnvironmentAction::Created);
    assert!(dir.join(".venv").is_dir());

    // lock file: every default pinned, plus transitive dependencies
    let lock = std::fs::read_to_string(dir.join("requirements.txt")).unwrap();
    assert!(!lock.is_empty());
    for package in kaggle_env::manifest::DEFAULT_PACKAGES {
        assert!(
            lock.lines().any(|l| l == format!("{package}==1.0.0")),
            "{package} missing from lock file"
        );
    }
    assert!(lock.lines().any(|l| l == "six==1.16.0"));
    assert!(lock.lines().all(|l| l.contains("==")));
    assert_eq!(
        outcome.manifest,
        ManifestSource::Defaults {
            packages: 28,
            lock_file: dir.join("requirements.txt"),
            pinned: 30,
        }
    );

    assert_eq!(outcome.verification.checks.len(), 6);
    assert!(outcome.verification.all_passed());
    assert_eq!(
        outcome.kernel,
        KernelStatus::Registered {
            name: "kaggle-py312".to_string()
        }
    );
    assert_eq!(
        outcome.helper,
        HelperStatus::Created {
            path: dir.join("activate.sh")
        }
    );
    let helper = std::fs::read_to_string(dir.join("activate.sh")).unwrap();
    assert!(helper.contains("Notebook kernel: Python 3.12 (Kaggle)"));

    // no questions asked in a recognized project with no environment yet
    assert!(prompter.questions().is_empty());

    let phases = handler.phases();
    assert!(matches!(phases.first(), Some(ProvisionPhase::Starting { .. })));
    assert!(matches!(phases.last(), Some(ProvisionPhase::Ready { .. })));
}

#[tokio::test]
async fn test_steps_run_in_order() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let toolchain = FakeToolchain::with_python("python3", "Python 3.12.4");

    let (result, _) = run(config_for(&dir), &toolchain, &ScriptedPrompter::default()).await;
    result.unwrap();

    let calls = toolchain.calls();
    let position = |prefix: &str| {
        calls
            .iter()
            .position(|c| c.starts_with(prefix))
            .unwrap_or_else(|| panic!("no call starting with {prefix}: {calls:?}"))
    };
    assert!(position("probe python3") < position("venv"));
    assert!(position("venv") < position("pip install --upgrade pip"));
    assert!(position("pip install --upgrade pip") < position("pip install numpy"));
    assert!(position("pip install numpy") < position("pip freeze"));
    assert!(position("pip freeze") < position("import numpy"));
    assert!(position("import xgboost") < position("kernel kaggle-py312"));
}

#[tokio::test]
async fn test_second_run_reuses_environment_and_helper() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let toolchain = FakeToolchain::with_python("python3", "Python 3.12.4");

    let (first, _) = run(config_for(&dir), &toolchain, &ScriptedPrompter::default()).await;
    first.unwrap();

    std::fs::write(dir.join(".venv").join("local-marker"), "keep me").unwrap();
    std::fs::write(dir.join("activate.sh"), "# customized by hand\n").unwrap();
    let env_before = list_dir(&dir.join(".venv"));

    // answer "no" to the recreate question
    let prompter = ScriptedPrompter::answering(&[false]);
    let (second, _) = run(config_for(&dir), &toolchain, &prompter).await;
    let outcome = second.unwrap();

    assert_eq!(outcome.environment_action, EnvironmentAction::Reused);
    assert_eq!(list_dir(&dir.join(".venv")), env_before);
    assert!(matches!(outcome.helper, HelperStatus::Kept { .. }));
    assert_eq!(
        std::fs::read_to_string(dir.join("activate.sh")).unwrap(),
        "# customized by hand\n"
    );

    let questions = prompter.questions();
    assert_eq!(questions.len(), 1);
    assert!(questions[0].contains("already exists"));

    let venv_calls = toolchain
        .calls()
        .iter()
        .filter(|c| c.starts_with("venv"))
        .count();
    assert_eq!(venv_calls, 1, "environment must only be created once");
}

#[tokio::test]
async fn test_lock_file_takes_precedence_and_is_untouched() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let lock_path = dir.join("requirements.txt");
    let lock = "# pinned by a previous run\nnumpy==1.26.4\npandas==2.2.2\nscikit-learn==1.5.0\n";
    std::fs::write(&lock_path, lock).unwrap();

    let toolchain = FakeToolchain::with_python("python3", "Python 3.12.4");
    let (result, handler) = run(config_for(&dir), &toolchain, &ScriptedPrompter::default()).await;
    let outcome = result.unwrap();

    assert_eq!(
        outcome.manifest,
        ManifestSource::LockFile {
            path: lock_path.clone(),
            entries: 3,
        }
    );
    assert_eq!(std::fs::read_to_string(&lock_path).unwrap(), lock);

    let calls = toolchain.calls();
    assert!(calls.contains(&format!("pip install -r {}", lock_path.display())));
    assert!(!calls.iter().any(|c| c.starts_with("pip install numpy")));
    assert!(!calls.contains(&"pip freeze".to_string()));
    assert!(!handler
        .phases()
        .iter()
        .any(|p| matches!(p, ProvisionPhase::InstallingPackages { .. })));
}

#[tokio::test]
async fn test_confirmed_recreation_discards_old_contents() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let env_root = dir.join(".venv");
    std::fs::create_dir_all(env_root.join("lib").join("stale")).unwrap();
    std::fs::write(env_root.join("lib").join("stale").join("old.py"), "x = 1").unwrap();
    std::fs::write(env_root.join("pyvenv.cfg"), "version = 3.11.2\n").unwrap();

    let toolchain = FakeToolchain::with_python("python3", "Python 3.12.4");
    let prompter = ScriptedPrompter::answering(&[true]);
    let (result, handler) = run(config_for(&dir), &toolchain, &prompter).await;
    let outcome = result.unwrap();

    assert_eq!(outcome.environment_action, EnvironmentAction::Recreated);
    assert!(!env_root.join("lib").exists());
    assert_eq!(
        std::fs::read_to_string(env_root.join("pyvenv.cfg")).unwrap(),
        "version = Python 3.12.4\n"
    );

    let phases = handler.phases();
    let removed = phases
        .iter()
        .position(|p| matches!(p, ProvisionPhase::RemovingEnvironment { .. }))
        .unwrap();
    let created = phases
        .iter()
        .position(|p| matches!(p, ProvisionPhase::CreatingVenv { .. }))
        .unwrap();
    assert!(removed < created);
}

#[tokio::test]
async fn test_explicit_decisions_bypass_prompt() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    std::fs::create_dir_all(dir.join(".venv")).unwrap();
    std::fs::write(dir.join(".venv").join("old"), "").unwrap();
    let toolchain = FakeToolchain::with_python("python3", "Python 3.12.4");

    // assume_yes keeps the default answer: reuse
    let prompter = ScriptedPrompter::answering(&[true]);
    let config = ProvisionConfig {
        assume_yes: true,
        ..config_for(&dir)
    };
    let (result, _) = run(config, &toolchain, &prompter).await;
    assert_eq!(result.unwrap().environment_action, EnvironmentAction::Reused);
    assert!(dir.join(".venv").join("old").exists());
    assert!(prompter.questions().is_empty());

    // an explicit --recreate wins over assume_yes
    let config = ProvisionConfig {
        assume_yes: true,
        recreate: Some(true),
        ..config_for(&dir)
    };
    let (result, _) = run(config, &toolchain, &prompter).await;
    assert_eq!(
        result.unwrap().environment_action,
        EnvironmentAction::Recreated
    );
    assert!(!dir.join(".venv").join("old").exists());
    assert!(prompter.questions().is_empty());
}

#[tokio::test]
async fn test_missing_interpreter_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let toolchain = FakeToolchain::with_python("python3", "Python 3.11.9");

    let (result, handler) = run(config_for(&dir), &toolchain, &ScriptedPrompter::default()).await;

    match result {
        Err(ProvisionError::InterpreterNotFound { version, tried }) => {
            assert_eq!(version, "3.12");
            assert_eq!(tried, vec!["python3", "python3.12"]);
        }
        other => panic!("expected InterpreterNotFound, got {other:?}"),
    }
    assert!(!dir.join(".venv").exists());
    assert!(!dir.join("requirements.txt").exists());
    assert!(!dir.join("activate.sh").exists());
    assert!(toolchain.calls().iter().all(|c| c.starts_with("probe")));
    assert!(matches!(
        handler.phases().last(),
        Some(ProvisionPhase::Error { .. })
    ));
}

#[tokio::test]
async fn test_windows_launcher_candidate() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let mut toolchain = FakeToolchain::with_python("python", "Python 3.11.2");
    toolchain
        .versions
        .insert("py -3.12".to_string(), "Python 3.12.1".to_string());

    let config = ProvisionConfig {
        shell: ShellKind::Cmd,
        ..ProvisionConfig::for_project(&dir)
    };
    let (result, _) = run(config, &toolchain, &ScriptedPrompter::default()).await;
    let outcome = result.unwrap();

    assert_eq!(outcome.interpreter.candidate.to_string(), "py -3.12");
    assert_eq!(outcome.interpreter.version, "Python 3.12.1");
    assert_eq!(
        outcome.environment.python_path,
        dir.join(".venv").join("Scripts").join("python.exe")
    );
    assert_eq!(
        outcome.helper,
        HelperStatus::Created {
            path: dir.join("activate.bat")
        }
    );
    // the version-suffixed command is never probed once the launcher matched
    assert!(!toolchain.calls().contains(&"probe python3.12".to_string()));
}

#[tokio::test]
async fn test_failed_import_does_not_stop_other_probes() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let mut toolchain = FakeToolchain::with_python("python3", "Python 3.12.4");
    toolchain.broken_modules.insert("pandas".to_string());

    let (result, handler) = run(config_for(&dir), &toolchain, &ScriptedPrompter::default()).await;
    let outcome = result.expect("import failures are advisory");

    let checks = &outcome.verification.checks;
    assert_eq!(checks.len(), 6);
    let failed: Vec<&str> = outcome
        .verification
        .failures()
        .map(|c| c.package.as_str())
        .collect();
    assert_eq!(failed, vec!["pandas"]);
    assert_eq!(checks.iter().filter(|c| c.passed).count(), 5);

    let probes = handler
        .phases()
        .iter()
        .filter(|p| matches!(p, ProvisionPhase::ImportChecked { .. }))
        .count();
    assert_eq!(probes, 6);
    assert!(handler
        .phases()
        .iter()
        .any(|p| matches!(p, ProvisionPhase::Warning { .. })));
}

#[tokio::test]
async fn test_kernel_failure_is_advisory() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let toolchain = FakeToolchain {
        fail_kernel: true,
        ..FakeToolchain::with_python("python3", "Python 3.12.4")
    };

    let (result, _) = run(config_for(&dir), &toolchain, &ScriptedPrompter::default()).await;
    let outcome = result.expect("kernel registration failure is advisory");

    assert!(matches!(outcome.kernel, KernelStatus::Failed { .. }));
    assert!(matches!(outcome.helper, HelperStatus::Created { .. }));
    let helper = std::fs::read_to_string(dir.join("activate.sh")).unwrap();
    assert!(!helper.contains("Notebook kernel"));
}

#[tokio::test]
async fn test_kernel_registration_can_be_skipped() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let toolchain = FakeToolchain::with_python("python3", "Python 3.12.4");
    let config = ProvisionConfig {
        kernel: None,
        ..config_for(&dir)
    };

    let (result, _) = run(config, &toolchain, &ScriptedPrompter::default()).await;
    assert_eq!(result.unwrap().kernel, KernelStatus::Skipped);
    assert!(!toolchain.calls().iter().any(|c| c.starts_with("kernel")));
}

#[tokio::test]
async fn test_install_failure_is_fatal() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let toolchain = FakeToolchain {
        fail_install: true,
        ..FakeToolchain::with_python("python3", "Python 3.12.4")
    };

    let (result, _) = run(config_for(&dir), &toolchain, &ScriptedPrompter::default()).await;

    assert!(matches!(result, Err(ProvisionError::Install(_))));
    // half-installed environment is left for inspection
    assert!(dir.join(".venv").is_dir());
    assert!(!dir.join("requirements.txt").exists());
    assert!(!dir.join("activate.sh").exists());
    assert!(!toolchain.calls().iter().any(|c| c.starts_with("import")));
}

#[tokio::test]
async fn test_unrecognized_directory_aborts_by_default() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("scratch");
    std::fs::create_dir_all(&dir).unwrap();
    let toolchain = FakeToolchain::with_python("python3", "Python 3.12.4");
    let prompter = ScriptedPrompter::default();

    let (result, _) = run(config_for(&dir), &toolchain, &prompter).await;

    assert!(matches!(result, Err(ProvisionError::Aborted(_))));
    assert_eq!(prompter.questions().len(), 1);
    assert!(toolchain.calls().is_empty());
    assert!(!dir.join(".venv").exists());
}

#[tokio::test]
async fn test_unrecognized_directory_can_continue() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("scratch");
    std::fs::create_dir_all(&dir).unwrap();
    let toolchain = FakeToolchain::with_python("python3", "Python 3.12.4");

    // operator confirms
    let prompter = ScriptedPrompter::answering(&[true]);
    let (result, _) = run(config_for(&dir), &toolchain, &prompter).await;
    assert!(result.is_ok());

    // assume_yes continues without asking, with a warning
    let other = temp.path().join("scratch-2");
    std::fs::create_dir_all(&other).unwrap();
    let prompter = ScriptedPrompter::default();
    let config = ProvisionConfig {
        assume_yes: true,
        ..config_for(&other)
    };
    let (result, handler) = run(config, &toolchain, &prompter).await;
    assert!(result.is_ok());
    assert!(prompter.questions().is_empty());
    assert!(handler
        .phases()
        .iter()
        .any(|p| matches!(p, ProvisionPhase::Warning { message } if message.contains("does not look like"))));
}

#[tokio::test]
async fn test_entry_point_file_recognizes_project() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("competition");
    std::fs::create_dir_all(dir.join("src")).unwrap();
    std::fs::write(dir.join("src").join("__init__.py"), "").unwrap();
    let toolchain = FakeToolchain::with_python("python3", "Python 3.12.4");
    let prompter = ScriptedPrompter::default();

    let (result, _) = run(config_for(&dir), &toolchain, &prompter).await;
    assert!(result.is_ok());
    assert!(prompter.questions().is_empty());
}

/// Nothing past environment setup may run after a fatal step there.
fn assert_stopped_before_install(toolchain: &FakeToolchain, dir: &Path) {
    assert!(!toolchain
        .calls()
        .iter()
        .any(|c| c.starts_with("pip") || c.starts_with("import") || c.starts_with("kernel")));
    assert!(!dir.join("requirements.txt").exists());
    assert!(!dir.join("activate.sh").exists());
}

#[tokio::test]
async fn test_failed_environment_creation_is_fatal() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let toolchain = FakeToolchain {
        fail_venv: true,
        ..FakeToolchain::with_python("python3", "Python 3.12.4")
    };

    let (result, handler) = run(config_for(&dir), &toolchain, &ScriptedPrompter::default()).await;

    match result {
        Err(ProvisionError::EnvironmentCreation { path, .. }) => {
            assert_eq!(path, dir.join(".venv"));
        }
        other => panic!("expected EnvironmentCreation, got {other:?}"),
    }
    assert_stopped_before_install(&toolchain, &dir);
    assert!(matches!(
        handler.phases().last(),
        Some(ProvisionPhase::Error { .. })
    ));
}

#[tokio::test]
async fn test_environment_must_exist_after_creation() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let toolchain = FakeToolchain {
        venv_leaves_no_dir: true,
        ..FakeToolchain::with_python("python3", "Python 3.12.4")
    };

    let (result, _) = run(config_for(&dir), &toolchain, &ScriptedPrompter::default()).await;

    match result {
        Err(ProvisionError::EnvironmentMissing(path)) => assert_eq!(path, dir.join(".venv")),
        other => panic!("expected EnvironmentMissing, got {other:?}"),
    }
    assert!(toolchain.calls().iter().any(|c| c.starts_with("venv")));
    assert_stopped_before_install(&toolchain, &dir);
}

#[tokio::test]
async fn test_plain_file_is_not_an_environment() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    std::fs::write(dir.join(".venv"), "not a directory").unwrap();
    let toolchain = FakeToolchain::with_python("python3", "Python 3.12.4");
    let prompter = ScriptedPrompter::default();

    let (result, handler) = run(config_for(&dir), &toolchain, &prompter).await;

    // treated as absent: no recreate question, no reuse, creation is attempted
    assert!(result.is_err());
    assert!(prompter.questions().is_empty());
    assert!(!handler
        .phases()
        .iter()
        .any(|p| matches!(p, ProvisionPhase::ReusingEnvironment { .. })));
    assert!(toolchain.calls().iter().any(|c| c.starts_with("venv")));
    assert_stopped_before_install(&toolchain, &dir);
}

#[cfg(unix)]
#[tokio::test]
async fn test_absolute_env_dir() {
    let temp = TempDir::new().unwrap();
    let dir = project_dir(&temp);
    let env_root = temp.path().join("venvs").join("titanic");
    let toolchain = FakeToolchain::with_python("python3", "Python 3.12.4");
    let config = ProvisionConfig {
        env_dir: env_root.to_string_lossy().to_string(),
        ..config_for(&dir)
    };

    let (result, _) = run(config, &toolchain, &ScriptedPrompter::default()).await;
    let outcome = result.unwrap();

    assert_eq!(outcome.environment.root, env_root);
    assert!(env_root.is_dir());
    assert!(!dir.join(".venv").exists());
    let helper = std::fs::read_to_string(dir.join("activate.sh")).unwrap();
    assert!(helper.contains(&format!("source \"{}/bin/activate\"", env_root.display())));
}
