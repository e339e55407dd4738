//! Runtime resolution
//!
//! Locates an interpreter whose `major.minor` equals the required version.
//! Probes run in a fixed order and each one swallows its own failure:
//!
//! 1. the version-aware launcher (`py -3.12` / `python3.12`)
//! 2. the default interpreter commands (`python3`, `python`)
//! 3. well-known installation paths
//!
//! When every probe misses and the platform ships a silent installer, the
//! installer is downloaded, run once, and the probes are repeated once.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::RuntimeConfig;
use crate::error::{Result, runtime as runtime_error};
use crate::host::{CommandSpec, Host};
use crate::platform::{Layout, Platform};
use crate::probe::first_match;

pub mod version;

pub use version::RuntimeVersion;

/// Prints the absolute path of the running interpreter
const PRINT_EXECUTABLE: &str = "import sys; print(sys.executable)";

/// Options for the silent Windows installer: per-user, on PATH, no extras
const INSTALLER_OPTIONS: [&str; 5] = [
    "/quiet",
    "InstallAllUsers=0",
    "PrependPath=1",
    "Include_test=0",
    "Include_launcher=1",
];

/// An interpreter found on the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeCandidate {
    pub path: PathBuf,
    pub version_string: String,
    pub satisfies: bool,
}

impl RuntimeCandidate {
    pub fn version(&self) -> Option<RuntimeVersion> {
        RuntimeVersion::from_version_output(&self.version_string)
    }

    /// Command running this interpreter
    pub fn command(&self) -> CommandSpec {
        CommandSpec::from_path(&self.path)
    }
}

/// One way of finding an interpreter
#[derive(Debug, Clone)]
enum Probe {
    /// A command that selects the version itself
    Launcher(CommandSpec),
    /// An unversioned interpreter command on PATH
    Default(String),
    /// A fixed installation path
    WellKnown(PathBuf),
}

impl Probe {
    fn describe(&self) -> String {
        match self {
            Probe::Launcher(command) => command.to_string(),
            Probe::Default(name) => format!("{name} --version"),
            Probe::WellKnown(path) => path.display().to_string(),
        }
    }
}

pub struct RuntimeResolver<'a> {
    host: &'a dyn Host,
    layout: &'a Layout,
    config: &'a RuntimeConfig,
    resolved: Option<RuntimeCandidate>,
    acquired: bool,
}

impl<'a> RuntimeResolver<'a> {
    pub fn new(host: &'a dyn Host, layout: &'a Layout, config: &'a RuntimeConfig) -> Self {
        Self {
            host,
            layout,
            config,
            resolved: None,
            acquired: false,
        }
    }

    /// Find an interpreter matching `required`, acquiring one if needed.
    ///
    /// A successful resolution is cached; later calls return it unchanged
    /// without probing again.
    pub fn resolve(&mut self, required: RuntimeVersion) -> Result<RuntimeCandidate> {
        if let Some(candidate) = &self.resolved {
            if candidate.version() == Some(required) {
                return Ok(candidate.clone());
            }
        }

        let mut tried = Vec::new();
        if let Some(candidate) = self.probe_all(required, &mut tried) {
            return Ok(self.remember(candidate));
        }

        if !self.acquired && self.acquire(&mut tried) {
            self.acquired = true;
            if let Some(candidate) = self.probe_all(required, &mut tried) {
                return Ok(self.remember(candidate));
            }
        }

        Err(runtime_error::not_found(
            required.to_string(),
            tried,
            self.manual_command(required),
        ))
    }

    fn remember(&mut self, candidate: RuntimeCandidate) -> RuntimeCandidate {
        info!(
            path = %candidate.path.display(),
            version = %candidate.version_string,
            "runtime resolved"
        );
        self.resolved = Some(candidate.clone());
        candidate
    }

    fn probes(&self, required: RuntimeVersion) -> Vec<Probe> {
        let mut probes = Vec::new();

        match self.layout.platform {
            Platform::Windows => {
                probes.push(Probe::Launcher(
                    CommandSpec::new("py")
                        .arg(format!("-{required}"))
                        .args(["-c", PRINT_EXECUTABLE]),
                ));
                probes.push(Probe::Default("python".to_string()));
                probes.push(Probe::Default("python3".to_string()));
            }
            Platform::Linux => {
                probes.push(Probe::Launcher(
                    CommandSpec::new(format!("python{required}")).args(["-c", PRINT_EXECUTABLE]),
                ));
                probes.push(Probe::Default("python3".to_string()));
                probes.push(Probe::Default("python".to_string()));
            }
        }

        probes.extend(
            self.well_known_paths(required)
                .into_iter()
                .map(Probe::WellKnown),
        );
        probes
    }

    fn well_known_paths(&self, required: RuntimeVersion) -> Vec<PathBuf> {
        match self.layout.platform {
            Platform::Linux => {
                let name = format!("python{required}");
                vec![
                    Path::new("/usr/bin").join(&name),
                    Path::new("/usr/local/bin").join(&name),
                    self.layout.user_bin_dir().join(&name),
                    self.layout.home.join(".pyenv").join("shims").join(&name),
                ]
            }
            Platform::Windows => {
                let dir = format!("Python{}", required.compact());
                let mut paths = vec![
                    self.layout
                        .data_dir
                        .join("Programs")
                        .join("Python")
                        .join(&dir)
                        .join("python.exe"),
                ];
                if let Some(program_files) = self.host.env_var("ProgramFiles") {
                    paths.push(PathBuf::from(program_files).join(&dir).join("python.exe"));
                }
                paths.push(PathBuf::from(format!("C:\\{dir}\\python.exe")));
                paths
            }
        }
    }

    fn probe_all(
        &self,
        required: RuntimeVersion,
        tried: &mut Vec<String>,
    ) -> Option<RuntimeCandidate> {
        first_match("runtime", self.probes(required), |probe| {
            tried.push(probe.describe());
            self.run_probe(probe, required)
        })
    }

    fn run_probe(&self, probe: &Probe, required: RuntimeVersion) -> Option<RuntimeCandidate> {
        match probe {
            Probe::Launcher(command) => {
                let path = self.query_executable(command)?;
                self.check_version(&path, required)
            }
            Probe::Default(name) => {
                let output = self
                    .host
                    .probe(&CommandSpec::new(name.as_str()).arg("--version"))
                    .map_err(|e| debug!(command = %name, error = %e, "probe failed"))
                    .ok()?;
                // Python 2 prints its version on stderr
                let version_string = output.combined().trim().to_string();
                let satisfies =
                    output.success && RuntimeVersion::from_version_output(&version_string) == Some(required);
                debug!(command = %name, version = %version_string, satisfies, "default interpreter");
                if !satisfies {
                    return None;
                }

                let path = self
                    .query_executable(&CommandSpec::new(name.as_str()).args(["-c", PRINT_EXECUTABLE]))
                    .unwrap_or_else(|| PathBuf::from(name));
                Some(RuntimeCandidate {
                    path,
                    version_string,
                    satisfies,
                })
            }
            Probe::WellKnown(path) => {
                if !self.host.exists(path) {
                    return None;
                }
                self.check_version(path, required)
            }
        }
    }

    /// Run a command printing `sys.executable` and return the printed path
    fn query_executable(&self, command: &CommandSpec) -> Option<PathBuf> {
        match self.host.probe(command) {
            Ok(output) if output.success => output.first_line().map(PathBuf::from),
            Ok(output) => {
                debug!(command = %command, code = ?output.code, "probe exited non-zero");
                None
            }
            Err(e) => {
                debug!(command = %command, error = %e, "probe failed");
                None
            }
        }
    }

    fn check_version(&self, path: &Path, required: RuntimeVersion) -> Option<RuntimeCandidate> {
        let output = self
            .host
            .probe(&CommandSpec::from_path(path).arg("--version"))
            .map_err(|e| debug!(path = %path.display(), error = %e, "version probe failed"))
            .ok()?;
        let version_string = output.combined().trim().to_string();
        let satisfies =
            output.success && RuntimeVersion::from_version_output(&version_string) == Some(required);
        debug!(path = %path.display(), version = %version_string, satisfies, "interpreter version");

        satisfies.then(|| RuntimeCandidate {
            path: path.to_path_buf(),
            version_string,
            satisfies,
        })
    }

    /// Download and silently run the interpreter installer
    fn acquire(&self, tried: &mut Vec<String>) -> bool {
        if self.layout.platform != Platform::Windows {
            debug!("no silent runtime installer for this platform");
            return false;
        }

        let url = self.config.installer_url();
        let file_name = url.rsplit('/').next().unwrap_or("python-installer.exe");
        let dest = self.layout.cache_dir.join(file_name);

        tried.push(format!("download {url}"));
        if let Err(e) = self.host.download(&url, &dest) {
            warn!(url = %url, error = %e, "runtime installer download failed");
            return false;
        }

        let install = CommandSpec::from_path(&dest).args(INSTALLER_OPTIONS);
        tried.push(install.to_string());
        match self.host.execute(&install) {
            Ok(output) if output.success => {
                info!(release = %self.config.installer_release, "runtime installed");
                true
            }
            Ok(output) => {
                warn!(code = ?output.code, "runtime installer exited non-zero");
                false
            }
            Err(e) => {
                warn!(error = %e, "runtime installer could not be started");
                false
            }
        }
    }

    fn manual_command(&self, required: RuntimeVersion) -> String {
        match self.layout.platform {
            Platform::Windows => format!("winget install Python.Python.{required}"),
            Platform::Linux => {
                format!("sudo apt install python{required} python{required}-venv")
            }
        }
    }
}
