//! Terminal rendering of progress events and the final summary.

use console::style;
use std::path::Path;

use kaggle_env::{
    EnvironmentAction, HelperStatus, KernelStatus, ManifestSource, ProgressHandler,
    ProvisionOutcome, ProvisionPhase,
};

/// Prints progress to stderr as colored status lines.
///
/// Installer output is streamed between these lines, so each event is a
/// single self-contained line.
pub struct TerminalHandler;

impl ProgressHandler for TerminalHandler {
    fn on_progress(&self, phase: ProvisionPhase) {
        log::debug!("[ui] {phase:?}");
        match phase {
            ProvisionPhase::Starting { project_dir } => {
                step(&format!(
                    "Setting up {}",
                    shorten_path(Path::new(&project_dir))
                ));
            }
            ProvisionPhase::DiscoveringInterpreter { version } => {
                step(&format!("Looking for Python {version}"));
            }
            ProvisionPhase::InterpreterFound { command, version } => {
                success(&format!("Using {version} ({command})"));
            }
            ProvisionPhase::ReusingEnvironment { env_path } => {
                success(&format!(
                    "Reusing environment at {}",
                    shorten_path(Path::new(&env_path))
                ));
            }
            ProvisionPhase::RemovingEnvironment { env_path } => {
                step(&format!(
                    "Removing environment at {}",
                    shorten_path(Path::new(&env_path))
                ));
            }
            ProvisionPhase::CreatingVenv { env_path } => {
                step(&format!(
                    "Creating environment at {}",
                    shorten_path(Path::new(&env_path))
                ));
            }
            ProvisionPhase::UpgradingInstaller => step("Upgrading pip"),
            ProvisionPhase::InstallingFromLockFile { lock_file } => {
                step(&format!(
                    "Installing from {}",
                    shorten_path(Path::new(&lock_file))
                ));
            }
            ProvisionPhase::InstallingPackages { packages } => {
                step(&format!("Installing {} packages", packages.len()));
            }
            ProvisionPhase::LockFileWritten {
                lock_file,
                package_count,
            } => {
                success(&format!(
                    "Pinned {package_count} packages in {}",
                    shorten_path(Path::new(&lock_file))
                ));
            }
            ProvisionPhase::Verifying { total } => {
                step(&format!("Checking {total} imports"));
            }
            ProvisionPhase::ImportChecked {
                package,
                module,
                passed,
            } => {
                let label = if package == module {
                    package
                } else {
                    format!("{package} ({module})")
                };
                if passed {
                    eprintln!("    {} {}", style("ok").green(), label);
                } else {
                    eprintln!("    {} {}", style("FAILED").red().bold(), label);
                }
            }
            ProvisionPhase::RegisteringKernel { display_name, .. } => {
                step(&format!("Registering kernel \"{display_name}\""));
            }
            ProvisionPhase::KernelRegistered { name } => {
                success(&format!("Kernel {name} registered"));
            }
            ProvisionPhase::HelperWritten { path } => {
                success(&format!(
                    "Wrote activation helper {}",
                    shorten_path(Path::new(&path))
                ));
            }
            ProvisionPhase::HelperKept { path } => {
                eprintln!(
                    "{} {} already exists, leaving it alone",
                    style("-").dim(),
                    shorten_path(Path::new(&path))
                );
            }
            ProvisionPhase::Ready { .. } => {}
            ProvisionPhase::Warning { message } => {
                eprintln!("{} {}", style("warning:").yellow().bold(), message);
            }
            // printed by main once the run returns
            ProvisionPhase::Error { .. } => {}
        }
    }
}

fn step(message: &str) {
    eprintln!("{} {}", style("==>").cyan().bold(), message);
}

fn success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Human-readable closing summary on stdout.
pub fn print_summary(outcome: &ProvisionOutcome) {
    let env_label = match outcome.environment_action {
        EnvironmentAction::Created => "created",
        EnvironmentAction::Reused => "reused",
        EnvironmentAction::Recreated => "recreated",
    };

    println!();
    println!("{}", style("Environment ready").green().bold());
    println!(
        "  Python:       {} ({})",
        outcome.interpreter.version, outcome.interpreter.candidate
    );
    println!(
        "  Environment:  {} ({env_label})",
        shorten_path(&outcome.environment.root)
    );
    match &outcome.manifest {
        ManifestSource::LockFile { path, entries } => {
            println!(
                "  Packages:     {entries} from {}",
                shorten_path(path)
            );
        }
        ManifestSource::Defaults {
            lock_file, pinned, ..
        } => {
            println!(
                "  Packages:     {pinned} pinned into {}",
                shorten_path(lock_file)
            );
        }
    }

    let total = outcome.verification.checks.len();
    let failed: Vec<&str> = outcome
        .verification
        .failures()
        .map(|c| c.package.as_str())
        .collect();
    if failed.is_empty() {
        println!("  Imports:      {total}/{total} ok");
    } else {
        println!(
            "  Imports:      {}/{total} ok, {} {}",
            total - failed.len(),
            style("failed:").yellow(),
            failed.join(", ")
        );
    }

    match &outcome.kernel {
        KernelStatus::Registered { name } => println!("  Kernel:       {name}"),
        KernelStatus::Skipped => println!("  Kernel:       {}", style("skipped").dim()),
        KernelStatus::Failed { .. } => {
            println!("  Kernel:       {}", style("not registered").yellow())
        }
    }

    let helper = outcome.helper.path();
    let helper_note = match &outcome.helper {
        HelperStatus::Created { .. } => "",
        HelperStatus::Kept { .. } => " (existing)",
    };
    println!("  Helper:       {}{helper_note}", shorten_path(helper));

    println!();
    println!("Activate the environment with:");
    println!("  {}", style(activation_command(helper)).bold());
}

/// The command an operator types to run the helper.
fn activation_command(helper: &Path) -> String {
    let name = helper
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    match helper.extension().and_then(|e| e.to_str()) {
        Some("sh") => format!("source {name}"),
        Some("ps1") => format!(".\\{name}"),
        _ => name,
    }
}

/// Shorten a path for display by replacing home directory with ~
pub fn shorten_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(relative) = path.strip_prefix(&home) {
            return format!("~/{}", relative.display());
        }
    }
    path.display().to_string()
}
