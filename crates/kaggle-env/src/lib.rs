//! Idempotent Python environment provisioning for Kaggle-style projects.
//!
//! This crate sets up a project-local virtual environment in one ordered,
//! re-runnable procedure:
//!
//! - Interpreter discovery across host-specific candidates
//! - Environment creation, reuse, or confirmed recreation
//! - Dependency installation from a lock file, or from a default set that
//!   is then frozen into a new lock file
//! - Smoke-test imports and notebook kernel registration (both advisory)
//! - A shell-specific activation helper, written once
//!
//! Every external process goes through the [`Toolchain`] trait, and every
//! yes/no decision through [`Prompter`], so the procedure itself can run
//! against fakes in tests.
//!
//! # Progress Reporting
//!
//! Steps emit [`ProvisionPhase`] events to a [`ProgressHandler`]. Consumers
//! implement this trait to route progress to their UI (terminal, JSON, logs).
//!
//! ```ignore
//! use kaggle_env::{LogHandler, NonInteractive, ProcessToolchain, ProvisionConfig, Provisioner};
//!
//! let toolchain = ProcessToolchain::default();
//! let provisioner = Provisioner::new(
//!     ProvisionConfig::for_project("."),
//!     &toolchain,
//!     &NonInteractive,
//!     std::sync::Arc::new(LogHandler),
//! );
//! let outcome = provisioner.run().await?;
//! ```

pub mod activation;
pub mod config;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod kernel;
pub mod manifest;
pub mod progress;
pub mod project;
pub mod prompt;
pub mod provisioner;
pub mod shell;
pub mod toolchain;
pub mod verify;

// Re-export key types
pub use activation::HelperStatus;
pub use config::ProvisionConfig;
pub use environment::{Environment, EnvironmentAction};
pub use error::{ProvisionError, ProvisionResult};
pub use interpreter::{Interpreter, InterpreterCandidate};
pub use kernel::{KernelSpec, KernelStatus};
pub use manifest::ManifestSource;
pub use progress::{LogHandler, ProgressHandler, ProvisionPhase};
pub use prompt::{NonInteractive, Prompter, StdinPrompter};
pub use provisioner::{ProvisionOutcome, Provisioner};
pub use shell::ShellKind;
pub use toolchain::{ProcessToolchain, Toolchain};
pub use verify::{SmokeTest, VerificationReport};
