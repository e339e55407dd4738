//! Provisioner - desktop installer for Witticism
//!
//! Resolves a matching Python runtime, detects GPU acceleration, installs the
//! application (isolated with pipx, or per-user with pip as a fallback) and
//! integrates it with the desktop through launcher, autostart and shortcut
//! entries.

use clap::Parser;

mod capability;
mod cli;
mod commands;
mod config;
mod error;
mod host;
mod installer;
mod integration;
mod logging;
mod operations;
mod platform;
mod probe;
mod runtime;
mod ui;
mod verify;

#[cfg(test)]
mod test_fixtures;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = if cli.build_info {
        commands::version::run()
    } else {
        commands::provision::run(&cli)
    };

    if let Err(e) = result {
        ui::display::print_fatal(&e);
        std::process::exit(1);
    }
}
