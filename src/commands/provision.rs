//! Provision command CLI wrapper
//!
//! This module provides the CLI interface for a provisioning run,
//! delegating all business logic to operations/provision.rs.

use crate::cli::Cli;
use crate::config::ProvisionConfig;
use crate::error::{Result, fs as fs_error};
use crate::host::{DryRunHost, SystemHost};
use crate::operations::{ProvisionOperation, ProvisionOptions, ProvisionSummary};
use crate::platform::Layout;
use crate::ui::display;
use crate::ui::{InteractiveProgressReporter, SilentProgressReporter};

/// Run a provisioning pass
///
/// Dry runs wrap the real host so every probe still sees this machine while
/// every change is only recorded and printed.
pub fn run(cli: &Cli) -> Result<()> {
    let config = ProvisionConfig::load(cli.config.as_deref())?;
    let layout = Layout::detect()
        .ok_or_else(|| fs_error::io_error("Could not determine the home directory"))?;
    let options = ProvisionOptions::from(cli);

    if options.dry_run {
        let host = DryRunHost::new(SystemHost::new());
        let result = ProvisionOperation::new(&host, &layout, &config, options)
            .execute(&mut SilentProgressReporter);

        display::print_planned(&host.planned());
        report(&result?, &config, true);
    } else {
        let host = SystemHost::new();
        let mut progress = InteractiveProgressReporter::new();
        let summary =
            ProvisionOperation::new(&host, &layout, &config, options).execute(&mut progress)?;
        report(&summary, &config, false);
    }

    Ok(())
}

fn report(summary: &ProvisionSummary, config: &ProvisionConfig, dry_run: bool) {
    display::print_warnings(summary.warnings());
    display::print_summary(summary, &config.package.display_name, dry_run);
}
