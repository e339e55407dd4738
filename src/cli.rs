//! CLI definitions using clap derive API

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};

use crate::operations::ProvisionOptions;

/// Provisioner - desktop installer for Witticism
///
/// Finds or installs a matching Python runtime, picks the right PyTorch
/// index for the GPU, installs the package and wires it into the desktop.
#[derive(Parser, Debug)]
#[command(
    name = "provisioner",
    author,
    disable_version_flag = true,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Install Witticism and integrate it with the desktop",
    long_about = "Provisioner resolves a Python runtime, detects GPU acceleration, installs the \
                  application in an isolated environment (falling back to a per-user install), \
                  and creates launcher, autostart and desktop shortcut entries.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  provisioner                          \x1b[90m# Install with GPU detection\x1b[0m\n   \
                  provisioner --dry-run                \x1b[90m# Show what would be done\x1b[0m\n   \
                  provisioner --cpu-only               \x1b[90m# Force the CPU package index\x1b[0m\n   \
                  provisioner --version 0.6.2          \x1b[90m# Install a specific version\x1b[0m\n   \
                  provisioner --force-reinstall        \x1b[90m# Remove and reinstall\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Do not create autostart entries
    #[arg(long)]
    pub skip_autostart: bool,

    /// Use the CPU package index even when a GPU is present
    #[arg(long)]
    pub cpu_only: bool,

    /// Remove earlier installs first and reinstall
    #[arg(long)]
    pub force_reinstall: bool,

    /// Package version to install (e.g. 0.6.2)
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Show what would be done without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Configuration file
    #[arg(long, value_name = "PATH", env = "PROVISIONER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seconds to wait for the installed application to answer --version
    #[arg(long, value_name = "SECS")]
    pub verify_timeout: Option<u64>,

    /// Show the provisioner's own version and build information
    #[arg(long)]
    pub build_info: bool,
}

impl From<&Cli> for ProvisionOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            skip_autostart: cli.skip_autostart,
            cpu_only: cli.cpu_only,
            force_reinstall: cli.force_reinstall,
            version: cli.version.clone(),
            dry_run: cli.dry_run,
            verify_timeout: cli.verify_timeout.map(Duration::from_secs),
        }
    }
}
