//! UI/Progress presentation layer
//!
//! This module handles:
//! - Stage progress for a provisioning run using an indicatif spinner
//! - Silent progress for dry-run mode and tests
//! - Summary, warning and `[DRY RUN]` output (via [`display`])

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub mod display;

/// Progress reporter for the provisioning stages
pub trait ProgressReporter {
    /// A new stage has started
    fn start_stage(&mut self, label: &str);

    /// The run completed, successfully or degraded
    fn finish(&mut self);

    /// The run stopped on a fatal error
    fn abandon(&mut self);
}

/// Spinner showing the current stage
pub struct InteractiveProgressReporter {
    spinner: ProgressBar,
}

impl InteractiveProgressReporter {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        // The template is a constant; a bad one falls back to the default style
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }
}

impl Default for InteractiveProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for InteractiveProgressReporter {
    fn start_stage(&mut self, label: &str) {
        self.spinner.set_message(label.to_string());
    }

    fn finish(&mut self) {
        self.spinner.finish_and_clear();
    }

    fn abandon(&mut self) {
        self.spinner.abandon();
    }
}

/// No-op reporter used for dry runs
#[derive(Default)]
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start_stage(&mut self, _label: &str) {}

    fn finish(&mut self) {}

    fn abandon(&mut self) {}
}
