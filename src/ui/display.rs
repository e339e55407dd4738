//! Display functions for a provisioning run
//!
//! This module renders the run summary, degraded-step warnings, planned
//! dry-run actions and fatal errors.

use console::Style;

use crate::error::ProvisionError;
use crate::host::PlannedAction;
use crate::installer::InstallMode;
use crate::integration::{IconRef, IntegrationState};
use crate::operations::ProvisionSummary;
use crate::verify::VerificationResult;

fn status(done: bool) -> String {
    if done {
        Style::new().green().apply_to("yes").to_string()
    } else {
        Style::new().red().apply_to("no").to_string()
    }
}

fn field(label: &str, value: impl std::fmt::Display) -> String {
    format!("  {} {}", Style::new().bold().apply_to(label), value)
}

/// Summary lines for a completed run
pub fn summary_lines(summary: &ProvisionSummary, package: &str, dry_run: bool) -> Vec<String> {
    let header = if dry_run {
        format!("[DRY RUN] Would provision {package}")
    } else {
        format!("Provisioned {package}")
    };

    let mode = match summary.outcome.mode {
        InstallMode::Isolated => "isolated (pipx)",
        InstallMode::Direct => "direct (pip --user)",
    };
    let acceleration = match &summary.profile.driver_version_string {
        Some(cuda) => format!("{} (CUDA {cuda})", summary.profile.selected_index_key),
        None => summary.profile.selected_index_key.to_string(),
    };

    let mut lines = vec![
        Style::new().bold().green().apply_to(header).to_string(),
        field(
            "Runtime:",
            format!(
                "{} ({})",
                summary.runtime.path.display(),
                summary.runtime.version_string
            ),
        ),
        field("Acceleration:", acceleration),
        field("Install mode:", mode),
        field("Icon:", icon(&summary.integration.assets.icon)),
    ];
    lines.extend(state_lines(&summary.integration.state));
    lines.push(field("Verification:", verification(&summary.verification)));
    lines
}

fn icon(icon: &IconRef) -> String {
    if icon.is_file() {
        icon.to_string()
    } else {
        format!("{icon} {}", Style::new().dim().apply_to("(platform default)"))
    }
}

fn state_lines(state: &IntegrationState) -> Vec<String> {
    let autostart = if state.autostart_skipped {
        Style::new().dim().apply_to("skipped").to_string()
    } else {
        status(state.autostart_written)
    };
    vec![
        field("Launcher:", status(state.launcher_written)),
        field("Autostart:", autostart),
        field("Desktop shortcut:", status(state.shortcut_written)),
    ]
}

fn verification(result: &VerificationResult) -> String {
    let style = match result {
        VerificationResult::Passed => Style::new().green(),
        VerificationResult::Skipped => Style::new().dim(),
        _ => Style::new().yellow(),
    };
    style.apply_to(result).to_string()
}

pub fn print_summary(summary: &ProvisionSummary, package: &str, dry_run: bool) {
    println!();
    for line in summary_lines(summary, package, dry_run) {
        println!("{line}");
    }
}

/// One `warning:` line per degraded step, on stderr
pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {warning}", Style::new().yellow().bold().apply_to("warning:"));
    }
}

/// `[DRY RUN] Would ...` line for a recorded mutation
pub fn planned_line(action: &PlannedAction) -> String {
    format!("[DRY RUN] Would {action}")
}

pub fn print_planned(actions: &[PlannedAction]) {
    for action in actions {
        println!("{}", planned_line(action));
    }
}

/// Lines describing a fatal error: cause, attempted remedies, manual command
pub fn fatal_lines(error: &ProvisionError) -> Vec<String> {
    use miette::Diagnostic;

    let mut lines = vec![format!("Error: {error}")];
    let attempted = error.attempted();
    if !attempted.is_empty() {
        lines.push("Tried:".to_string());
        lines.extend(attempted.iter().map(|a| format!("  - {a}")));
    }
    if let Some(help) = error.help() {
        lines.push(format!("help: {help}"));
    }
    lines
}

pub fn print_fatal(error: &ProvisionError) {
    for line in fatal_lines(error) {
        eprintln!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::capability::AccelerationProfile;
    use crate::error::install::failed;
    use crate::installer::InstallOutcome;
    use crate::integration::{AssetBundle, Integration};
    use crate::runtime::RuntimeCandidate;

    fn summary() -> ProvisionSummary {
        ProvisionSummary {
            runtime: RuntimeCandidate {
                path: PathBuf::from("/usr/bin/python3.12"),
                version_string: "Python 3.12.4".to_string(),
                satisfies: true,
            },
            profile: AccelerationProfile::cpu(),
            outcome: InstallOutcome {
                mode: InstallMode::Direct,
                success: true,
                package_root: None,
            },
            integration: Integration {
                assets: AssetBundle {
                    root: None,
                    sized_icons: Vec::new(),
                    icon: IconRef::PlatformDefault("audio-input-microphone"),
                },
                state: IntegrationState {
                    launcher_written: true,
                    autostart_skipped: true,
                    ..IntegrationState::default()
                },
                warnings: Vec::new(),
            },
            verification: VerificationResult::TimedOut,
        }
    }

    #[test]
    fn test_summary_lines() {
        console::set_colors_enabled(false);
        let lines = summary_lines(&summary(), "witticism", false);

        assert_eq!(lines[0], "Provisioned witticism");
        assert!(lines.contains(&"  Runtime: /usr/bin/python3.12 (Python 3.12.4)".to_string()));
        assert!(lines.contains(&"  Install mode: direct (pip --user)".to_string()));
        assert!(lines.contains(
            &"  Icon: audio-input-microphone (platform default)".to_string()
        ));
        assert!(lines.contains(&"  Autostart: skipped".to_string()));
        assert!(lines.contains(&"  Desktop shortcut: no".to_string()));
        assert!(lines.contains(&"  Verification: timed out".to_string()));
    }

    #[test]
    fn test_dry_run_summary_header() {
        console::set_colors_enabled(false);
        let lines = summary_lines(&summary(), "witticism", true);
        assert_eq!(lines[0], "[DRY RUN] Would provision witticism");
    }

    #[test]
    fn test_planned_line() {
        let action = PlannedAction::Execute("python3 -m pipx install witticism".to_string());
        assert_eq!(
            planned_line(&action),
            "[DRY RUN] Would run: python3 -m pipx install witticism"
        );
    }

    #[test]
    fn test_fatal_lines_list_attempts_and_help() {
        let error = failed(
            "witticism",
            vec!["pipx install witticism".to_string(), "pip install --user witticism".to_string()],
            "pip install --user witticism",
        );

        let lines = fatal_lines(&error);

        assert_eq!(lines[0], "Error: Failed to install 'witticism'");
        assert_eq!(lines[1], "Tried:");
        assert_eq!(lines[2], "  - pipx install witticism");
        assert_eq!(
            lines.last().unwrap(),
            "help: Retry the installation manually: pip install --user witticism"
        );
    }
}
