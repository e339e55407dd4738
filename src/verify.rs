//! Post-install verification
//!
//! Starts the installed entry point with `--version` under a deadline. The
//! result is advisory: it is reported in the summary and never fails a run.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::PackageConfig;
use crate::host::{BoundedOutcome, Host};
use crate::installer::InstallOutcome;
use crate::integration::LaunchResolver;
use crate::platform::Layout;
use crate::runtime::RuntimeCandidate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// The entry point ran and identified itself
    Passed,
    /// The entry point ran but its output did not name the package
    Inconclusive(String),
    /// Killed after the deadline
    TimedOut,
    /// Not attempted (dry run)
    Skipped,
    /// The entry point could not be started
    Unavailable(String),
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationResult::Passed => write!(f, "passed"),
            VerificationResult::Inconclusive(detail) => write!(f, "inconclusive ({detail})"),
            VerificationResult::TimedOut => write!(f, "timed out"),
            VerificationResult::Skipped => write!(f, "skipped"),
            VerificationResult::Unavailable(reason) => write!(f, "unavailable ({reason})"),
        }
    }
}

pub struct InstallationVerifier<'a> {
    host: &'a dyn Host,
    layout: &'a Layout,
    package: &'a PackageConfig,
    runtime: &'a RuntimeCandidate,
}

impl<'a> InstallationVerifier<'a> {
    pub fn new(
        host: &'a dyn Host,
        layout: &'a Layout,
        package: &'a PackageConfig,
        runtime: &'a RuntimeCandidate,
    ) -> Self {
        Self {
            host,
            layout,
            package,
            runtime,
        }
    }

    pub fn verify(&self, outcome: &InstallOutcome, timeout: Duration) -> VerificationResult {
        let launch = LaunchResolver::new(self.host, self.layout, self.runtime, self.package)
            .preferred(outcome);
        let command = launch.to_command().arg("--version");
        debug!(%command, ?timeout, "verifying installation");

        let result = match self.host.run_bounded(&command, timeout) {
            Ok(BoundedOutcome::Completed(output)) => {
                let names_package = output
                    .combined()
                    .to_lowercase()
                    .contains(&self.package.name.to_lowercase());
                if output.success && names_package {
                    VerificationResult::Passed
                } else {
                    let detail = output
                        .first_line()
                        .or_else(|| output.stderr_tail())
                        .map_or_else(
                            || format!("no output, exit code {:?}", output.code),
                            str::to_string,
                        );
                    VerificationResult::Inconclusive(detail)
                }
            }
            Ok(BoundedOutcome::TimedOut) => VerificationResult::TimedOut,
            Err(e) => VerificationResult::Unavailable(e.to_string()),
        };

        match &result {
            VerificationResult::Passed => info!("installation verified"),
            other => warn!(result = %other, "installation could not be verified"),
        }
        result
    }
}
