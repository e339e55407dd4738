//! Package installation
//!
//! This module handles:
//! - Making sure the isolation tool (pipx) is importable by the runtime
//! - Removing earlier installs when a reinstall is forced
//! - The isolated install, with a direct `pip --user` install as fallback
//!
//! The [`InstallMode`] recorded in the outcome decides every path the later
//! stages look at, so it always reflects the strategy that actually succeeded.

use std::fmt;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::capability::AccelerationProfile;
use crate::config::IndexConfig;
use crate::error::{Result, install as install_error};
use crate::host::{CommandSpec, Host, require_success};
use crate::probe::best_effort;
use crate::runtime::RuntimeCandidate;

pub mod package;

pub use package::PackageSpec;

/// Prints the per-user site-packages directory
const PRINT_USER_SITE: &str = "import site; print(site.getusersitepackages())";

/// How the package ended up installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// In its own virtual environment managed by pipx
    Isolated,
    /// Into the runtime's per-user site-packages
    Direct,
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallMode::Isolated => write!(f, "isolated"),
            InstallMode::Direct => write!(f, "direct"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub mode: InstallMode,
    pub success: bool,
    /// Per-user site-packages for direct installs
    pub package_root: Option<PathBuf>,
}

/// `python -m pipx <args>`
pub fn pipx(runtime: &RuntimeCandidate) -> CommandSpec {
    runtime.command().args(["-m", "pipx"])
}

/// `python -m pip <args>`
pub fn pip(runtime: &RuntimeCandidate) -> CommandSpec {
    runtime.command().args(["-m", "pip"])
}

/// Ask the runtime for its per-user site-packages directory
pub fn query_user_site(host: &dyn Host, runtime: &RuntimeCandidate) -> Option<PathBuf> {
    let command = runtime.command().args(["-c", PRINT_USER_SITE]);
    best_effort("user site query", || require_success(host.probe(&command)))
        .and_then(|output| output.first_line().map(PathBuf::from))
}

pub struct PackageInstaller<'a> {
    host: &'a dyn Host,
    runtime: &'a RuntimeCandidate,
    indexes: &'a IndexConfig,
}

impl<'a> PackageInstaller<'a> {
    pub fn new(host: &'a dyn Host, runtime: &'a RuntimeCandidate, indexes: &'a IndexConfig) -> Self {
        Self {
            host,
            runtime,
            indexes,
        }
    }

    /// Install `spec` from the index selected by `profile`.
    ///
    /// The direct strategy is attempted exactly once, and only when the
    /// isolated one fails.
    pub fn install(
        &self,
        spec: &PackageSpec,
        profile: &AccelerationProfile,
        force_reinstall: bool,
    ) -> Result<InstallOutcome> {
        self.ensure_isolation_tool();

        if force_reinstall {
            self.remove_previous(spec);
        }

        let index = profile.selected_index_key.index_url(self.indexes);
        let mut attempts = Vec::new();

        let isolated = self.isolated_command(spec, index, force_reinstall);
        attempts.push(isolated.to_string());
        if self.run_strategy(InstallMode::Isolated, &isolated) {
            return Ok(InstallOutcome {
                mode: InstallMode::Isolated,
                success: true,
                package_root: None,
            });
        }

        let direct = self.direct_command(spec, index, force_reinstall);
        attempts.push(direct.to_string());
        if self.run_strategy(InstallMode::Direct, &direct) {
            return Ok(InstallOutcome {
                mode: InstallMode::Direct,
                success: true,
                package_root: query_user_site(self.host, self.runtime),
            });
        }

        Err(install_error::failed(
            spec.name.clone(),
            attempts,
            direct.to_string(),
        ))
    }

    fn ensure_isolation_tool(&self) {
        let version = pipx(self.runtime).arg("--version");
        if require_success(self.host.probe(&version)).is_ok() {
            return;
        }

        info!("pipx not available, installing it for the user");
        let install = pip(self.runtime).args(["install", "--user", "pipx"]);
        best_effort("pipx bootstrap", || require_success(self.host.execute(&install)));
    }

    /// Remove earlier isolated and direct installs; either may be absent
    fn remove_previous(&self, spec: &PackageSpec) {
        let isolated = pipx(self.runtime).args(["uninstall", spec.name.as_str()]);
        best_effort("isolated removal", || {
            require_success(self.host.execute(&isolated))
        });

        let direct = pip(self.runtime).args(["uninstall", "-y", spec.name.as_str()]);
        best_effort("direct removal", || require_success(self.host.execute(&direct)));
    }

    fn isolated_command(&self, spec: &PackageSpec, index: &str, force: bool) -> CommandSpec {
        let mut command = pipx(self.runtime)
            .args(["install", spec.requirement().as_str()])
            .arg("--python")
            .arg(self.runtime.path.display().to_string());
        if force {
            command = command.arg("--force");
        }
        // A separate argument starting with "--" would be parsed as a pipx option
        command.arg(format!(
            "--pip-args=--index-url {index} --extra-index-url {}",
            self.indexes.fallback
        ))
    }

    fn direct_command(&self, spec: &PackageSpec, index: &str, force: bool) -> CommandSpec {
        let mut command = pip(self.runtime).args(["install", "--user"]);
        if force {
            command = command.arg("--force-reinstall");
        }
        command
            .arg(spec.requirement())
            .args(["--index-url", index])
            .args(["--extra-index-url", self.indexes.fallback.as_str()])
    }

    fn run_strategy(&self, mode: InstallMode, command: &CommandSpec) -> bool {
        match require_success(self.host.execute(command)) {
            Ok(_) => {
                info!(%mode, "package installed");
                true
            }
            Err(reason) => {
                warn!(%mode, %reason, "install strategy failed");
                false
            }
        }
    }
}
