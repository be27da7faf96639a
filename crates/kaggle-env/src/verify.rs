//! Smoke-test verification.
//!
//! Each probe is an independent `import` in the environment's interpreter.
//! Results are diagnostic only and never fail the run.

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::progress::{ProgressHandler, ProvisionPhase};
use crate::toolchain::Toolchain;

/// A package to probe and the module name it is imported by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmokeTest {
    pub package: String,
    pub module: String,
}

impl SmokeTest {
    pub fn new(package: &str, module: &str) -> Self {
        Self {
            package: package.to_string(),
            module: module.to_string(),
        }
    }
}

/// The six canonical packages every provisioned environment should import.
pub fn default_smoke_tests() -> Vec<SmokeTest> {
    vec![
        SmokeTest::new("numpy", "numpy"),
        SmokeTest::new("pandas", "pandas"),
        SmokeTest::new("scikit-learn", "sklearn"),
        SmokeTest::new("matplotlib", "matplotlib"),
        SmokeTest::new("seaborn", "seaborn"),
        SmokeTest::new("xgboost", "xgboost"),
    ]
}

/// One probe result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCheck {
    pub package: String,
    pub module: String,
    pub passed: bool,
}

/// Results of all probes, in probe order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub checks: Vec<ImportCheck>,
}

impl VerificationReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ImportCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// Probe every smoke test in `env`. A failed import never stops the
/// remaining probes.
pub async fn verify(
    toolchain: &dyn Toolchain,
    env: &Environment,
    tests: &[SmokeTest],
    handler: &dyn ProgressHandler,
) -> VerificationReport {
    handler.on_progress(ProvisionPhase::Verifying { total: tests.len() });

    let mut report = VerificationReport::default();
    for test in tests {
        let passed = toolchain.can_import(env, &test.module).await;
        handler.on_progress(ProvisionPhase::ImportChecked {
            package: test.package.clone(),
            module: test.module.clone(),
            passed,
        });
        report.checks.push(ImportCheck {
            package: test.package.clone(),
            module: test.module.clone(),
            passed,
        });
    }

    let failed = report.failures().count();
    if failed > 0 {
        handler.on_progress(ProvisionPhase::Warning {
            message: format!(
                "{failed} of {} packages failed to import; the environment may be incomplete",
                tests.len()
            ),
        });
    }

    report
}
