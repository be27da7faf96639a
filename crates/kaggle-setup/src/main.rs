use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use kaggle_env::{
    KernelSpec, LogHandler, NonInteractive, ProcessToolchain, ProgressHandler, Prompter,
    ProvisionConfig, Provisioner, ShellKind, StdinPrompter,
};

mod ui;

use crate::ui::TerminalHandler;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    project_dir: Option<PathBuf>,

    /// Required Python version (major.minor)
    #[arg(long = "python", value_name = "VER", default_value = kaggle_env::config::DEFAULT_PYTHON_VERSION)]
    python_version: String,

    /// Environment directory, relative to the project root
    #[arg(long, value_name = "NAME", default_value = kaggle_env::config::DEFAULT_ENV_DIR)]
    env_dir: String,

    /// Lock file, relative to the project root
    #[arg(long, value_name = "NAME", default_value = kaggle_env::config::DEFAULT_LOCK_FILE)]
    lock_file: String,

    /// Don't ask for confirmation; keeps an existing environment
    #[arg(short, long)]
    yes: bool,

    /// Delete and recreate an existing environment without asking
    #[arg(long, conflicts_with = "reuse")]
    recreate: bool,

    /// Keep an existing environment without asking
    #[arg(long)]
    reuse: bool,

    /// Skip Jupyter kernel registration
    #[arg(long)]
    no_kernel: bool,

    /// Kernel name (defaults to kaggle-py<version>)
    #[arg(long, conflicts_with = "no_kernel")]
    kernel_name: Option<String>,

    /// Kernel display name (defaults to "Python <version> (Kaggle)")
    #[arg(long, conflicts_with = "no_kernel")]
    kernel_display_name: Option<String>,

    /// Shell to generate the activation helper for: posix, cmd, powershell
    #[arg(long)]
    shell: Option<ShellKind>,

    /// Print the outcome as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    /// Layer the flags over the library defaults.
    fn to_config(&self) -> Result<ProvisionConfig> {
        let project_dir = match &self.project_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to read the current directory")?,
        };

        let kernel = if self.no_kernel {
            None
        } else {
            let mut spec = KernelSpec::for_version(&self.python_version);
            if let Some(name) = &self.kernel_name {
                spec.name = name.clone();
            }
            if let Some(display_name) = &self.kernel_display_name {
                spec.display_name = display_name.clone();
            }
            Some(spec)
        };

        let recreate = match (self.recreate, self.reuse) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        let mut config = ProvisionConfig::for_project(project_dir);
        config.python_version = self.python_version.clone();
        config.env_dir = self.env_dir.clone();
        config.lock_file = self.lock_file.clone();
        config.kernel = kernel;
        config.recreate = recreate;
        config.assume_yes = self.yes;
        if let Some(shell) = self.shell {
            config.shell = shell;
        }
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", console::style("error:").red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.to_config()?;
    log::debug!("Provisioning with {config:?}");

    // JSON output owns stdout, so installer output is captured and progress
    // only goes to the log.
    let toolchain = ProcessToolchain::new(cli.json);
    let handler: Arc<dyn ProgressHandler> = if cli.json {
        Arc::new(LogHandler)
    } else {
        Arc::new(TerminalHandler)
    };
    let prompter: Box<dyn Prompter> = if cli.yes {
        Box::new(NonInteractive)
    } else {
        Box::new(StdinPrompter)
    };

    let provisioner = Provisioner::new(config, &toolchain, prompter.as_ref(), handler);
    let outcome = provisioner.run().await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        ui::print_summary(&outcome);
    }
    Ok(())
}
