//! Provision operation
//!
//! Runs the five stages in order, each consuming the records produced by the
//! ones before it:
//!
//! 1. runtime resolution (fatal on failure)
//! 2. capability detection (never fails, worst case is the cpu tier)
//! 3. package installation (fatal on failure)
//! 4. desktop integration (failures are warnings)
//! 5. verification (advisory, skipped in dry runs)

use std::fmt;
use std::time::Duration;

use tracing::info;

use crate::capability::{AccelerationProfile, CapabilityDetector};
use crate::config::ProvisionConfig;
use crate::error::{Result, config as config_error};
use crate::host::Host;
use crate::installer::{InstallOutcome, PackageInstaller, PackageSpec};
use crate::integration::{Integration, IntegrationWirer};
use crate::platform::Layout;
use crate::runtime::{RuntimeCandidate, RuntimeResolver, RuntimeVersion};
use crate::ui::ProgressReporter;
use crate::verify::{InstallationVerifier, VerificationResult};

/// Options taken from the command line
#[derive(Debug, Clone, Default)]
pub struct ProvisionOptions {
    pub skip_autostart: bool,
    pub cpu_only: bool,
    pub force_reinstall: bool,
    /// Pinned package version
    pub version: Option<String>,
    pub dry_run: bool,
    /// Overrides the configured verification timeout
    pub verify_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Runtime,
    Capability,
    Install,
    Integration,
    Verify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Runtime => "Resolving Python runtime",
            Stage::Capability => "Detecting GPU acceleration",
            Stage::Install => "Installing package",
            Stage::Integration => "Creating desktop integration",
            Stage::Verify => "Verifying installation",
        };
        write!(f, "{label}")
    }
}

/// Everything a completed run decided and did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSummary {
    pub runtime: RuntimeCandidate,
    pub profile: AccelerationProfile,
    pub outcome: InstallOutcome,
    pub integration: Integration,
    pub verification: VerificationResult,
}

impl ProvisionSummary {
    pub fn warnings(&self) -> &[String] {
        &self.integration.warnings
    }
}

pub struct ProvisionOperation<'a> {
    host: &'a dyn Host,
    layout: &'a Layout,
    config: &'a ProvisionConfig,
    options: ProvisionOptions,
}

impl<'a> ProvisionOperation<'a> {
    pub fn new(
        host: &'a dyn Host,
        layout: &'a Layout,
        config: &'a ProvisionConfig,
        options: ProvisionOptions,
    ) -> Self {
        Self {
            host,
            layout,
            config,
            options,
        }
    }

    pub fn execute(&self, progress: &mut dyn ProgressReporter) -> Result<ProvisionSummary> {
        let result = self.run_stages(progress);
        match &result {
            Ok(_) => progress.finish(),
            Err(_) => progress.abandon(),
        }
        result
    }

    fn run_stages(&self, progress: &mut dyn ProgressReporter) -> Result<ProvisionSummary> {
        // Reject a bad pin before touching the machine
        let spec = PackageSpec::new(&self.config.package.name, self.options.version.as_deref())?;
        let required = RuntimeVersion::parse(&self.config.runtime.version).ok_or_else(|| {
            config_error::invalid_value(
                "runtime.version",
                &self.config.runtime.version,
                "expected MAJOR.MINOR",
            )
        })?;

        self.enter(progress, Stage::Runtime);
        let runtime =
            RuntimeResolver::new(self.host, self.layout, &self.config.runtime).resolve(required)?;

        self.enter(progress, Stage::Capability);
        let profile = CapabilityDetector::new(self.host).detect(self.options.cpu_only);

        self.enter(progress, Stage::Install);
        let outcome = PackageInstaller::new(self.host, &runtime, &self.config.indexes).install(
            &spec,
            &profile,
            self.options.force_reinstall,
        )?;

        self.enter(progress, Stage::Integration);
        let integration = IntegrationWirer::new(
            self.host,
            self.layout,
            &self.config.package,
            &runtime,
        )
        .wire(&outcome, self.options.skip_autostart);

        let verification = if self.options.dry_run {
            VerificationResult::Skipped
        } else {
            self.enter(progress, Stage::Verify);
            InstallationVerifier::new(self.host, self.layout, &self.config.package, &runtime)
                .verify(&outcome, self.verify_timeout())
        };

        Ok(ProvisionSummary {
            runtime,
            profile,
            outcome,
            integration,
            verification,
        })
    }

    fn enter(&self, progress: &mut dyn ProgressReporter, stage: Stage) {
        info!(%stage, "stage started");
        progress.start_stage(&stage.to_string());
    }

    fn verify_timeout(&self) -> Duration {
        self.options
            .verify_timeout
            .unwrap_or_else(|| Duration::from_secs(self.config.verify.timeout_secs))
    }
}
