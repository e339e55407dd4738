//! How the installed application is started
//!
//! A directly resolvable console entry point is preferred. Without one the
//! application is started through a wrapped invocation that depends on the
//! install mode: `pipx run` for isolated installs, `python -m` for direct ones.

use std::path::{Path, PathBuf};

use crate::config::PackageConfig;
use crate::host::{CommandSpec, Host, require_success};
use crate::installer::{InstallMode, InstallOutcome, pipx};
use crate::platform::{Layout, Platform};
use crate::probe::{best_effort, first_match};
use crate::runtime::RuntimeCandidate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchCommand {
    /// Console entry point on disk
    Executable(PathBuf),
    /// `python -m pipx run <package>`
    IsolatedRun { python: PathBuf, package: String },
    /// `python -m <module>`
    ModuleRun { python: PathBuf, module: String },
}

impl LaunchCommand {
    /// The wrapped invocation for `mode`
    pub fn wrapped(mode: InstallMode, runtime: &RuntimeCandidate, package: &PackageConfig) -> Self {
        match mode {
            InstallMode::Isolated => LaunchCommand::IsolatedRun {
                python: runtime.path.clone(),
                package: package.name.clone(),
            },
            InstallMode::Direct => LaunchCommand::ModuleRun {
                python: runtime.path.clone(),
                module: package.module.clone(),
            },
        }
    }

    pub fn to_command(&self) -> CommandSpec {
        match self {
            LaunchCommand::Executable(path) => CommandSpec::from_path(path),
            LaunchCommand::IsolatedRun { python, package } => CommandSpec::from_path(python)
                .args(["-m", "pipx", "run", package.as_str()]),
            LaunchCommand::ModuleRun { python, module } => {
                CommandSpec::from_path(python).args(["-m", module.as_str()])
            }
        }
    }
}

/// Finds the launch command for an install outcome
pub struct LaunchResolver<'a> {
    host: &'a dyn Host,
    layout: &'a Layout,
    runtime: &'a RuntimeCandidate,
    package: &'a PackageConfig,
}

impl<'a> LaunchResolver<'a> {
    pub fn new(
        host: &'a dyn Host,
        layout: &'a Layout,
        runtime: &'a RuntimeCandidate,
        package: &'a PackageConfig,
    ) -> Self {
        Self {
            host,
            layout,
            runtime,
            package,
        }
    }

    /// Executable when one exists, the wrapped invocation otherwise
    pub fn preferred(&self, outcome: &InstallOutcome) -> LaunchCommand {
        self.executable(outcome).map_or_else(
            || LaunchCommand::wrapped(outcome.mode, self.runtime, self.package),
            LaunchCommand::Executable,
        )
    }

    /// Wrapped invocation for startup entries
    pub fn wrapped(&self, outcome: &InstallOutcome) -> LaunchCommand {
        LaunchCommand::wrapped(outcome.mode, self.runtime, self.package)
    }

    /// Console entry point installed for `outcome`, if it can be found
    pub fn executable(&self, outcome: &InstallOutcome) -> Option<PathBuf> {
        let name = self.layout.platform.executable_name(&self.package.name);
        let dirs = match outcome.mode {
            InstallMode::Isolated => self.isolated_bin_dirs(),
            InstallMode::Direct => self.direct_bin_dirs(outcome.package_root.as_deref()),
        };

        first_match("executable", dirs, |dir| {
            let path = dir.join(&name);
            self.host.exists(&path).then_some(path)
        })
    }

    fn isolated_bin_dirs(&self) -> Vec<PathBuf> {
        let query = pipx(self.runtime).args(["environment", "--value", "PIPX_BIN_DIR"]);
        let mut dirs: Vec<PathBuf> = best_effort("pipx bin dir query", || {
            require_success(self.host.probe(&query))
        })
        .and_then(|output| output.first_line().map(PathBuf::from))
        .into_iter()
        .collect();

        let default = self.layout.user_bin_dir();
        if !dirs.contains(&default) {
            dirs.push(default);
        }
        dirs
    }

    fn direct_bin_dirs(&self, user_site: Option<&Path>) -> Vec<PathBuf> {
        match self.layout.platform {
            Platform::Linux => vec![self.layout.user_bin_dir()],
            // %APPDATA%\Python\Python312\site-packages -> ...\Python312\Scripts
            Platform::Windows => user_site
                .and_then(Path::parent)
                .map(|base| base.join("Scripts"))
                .into_iter()
                .collect(),
        }
    }
}
