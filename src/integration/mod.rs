//! Desktop integration
//!
//! This module handles:
//! - Locating the installed package's assets and resolving its icon
//! - Installing icons into the user's icon theme (freedesktop)
//! - The application launcher entry
//! - The autostart entry (unless skipped)
//! - The desktop shortcut
//!
//! Each step runs on its own: a failing step becomes a warning and the
//! remaining steps are still attempted.

use std::path::Path;

use tracing::{info, warn};

use crate::config::PackageConfig;
use crate::host::{CommandSpec, Host, require_success};
use crate::installer::InstallOutcome;
use crate::platform::{Layout, Platform};
use crate::probe::best_effort;
use crate::runtime::RuntimeCandidate;

pub mod assets;
pub mod entries;
pub mod launch;

pub use assets::{AssetBundle, IconRef};
pub use launch::{LaunchCommand, LaunchResolver};

use entries::DesktopEntry;

/// Which integration steps completed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrationState {
    pub icons_installed: bool,
    pub launcher_written: bool,
    pub autostart_written: bool,
    pub autostart_skipped: bool,
    pub shortcut_written: bool,
}

/// Result of wiring the application into the desktop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integration {
    pub assets: AssetBundle,
    pub state: IntegrationState,
    /// One line per degraded step
    pub warnings: Vec<String>,
}

pub struct IntegrationWirer<'a> {
    host: &'a dyn Host,
    layout: &'a Layout,
    package: &'a PackageConfig,
    runtime: &'a RuntimeCandidate,
}

impl<'a> IntegrationWirer<'a> {
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

    pub fn wire(&self, outcome: &InstallOutcome, skip_autostart: bool) -> Integration {
        let mut warnings = Vec::new();
        let mut state = IntegrationState::default();

        let candidates =
            assets::asset_candidates(self.host, self.layout, self.runtime, self.package, outcome);
        let bundle = assets::discover(self.host, self.layout, self.package, candidates);
        if bundle.root.is_none() {
            warnings.push(format!(
                "assets for {} not found, using the default icon",
                self.package.name
            ));
        }

        let resolver = LaunchResolver::new(self.host, self.layout, self.runtime, self.package);
        let preferred = resolver.preferred(outcome).to_command();
        info!(launch = %preferred, icon = %bundle.icon, "wiring desktop integration");

        if self.layout.platform == Platform::Linux && !bundle.sized_icons.is_empty() {
            state.icons_installed = self.install_icons(&bundle, &mut warnings);
        }

        state.launcher_written = self.step("launcher entry", &mut warnings, || {
            self.write_launcher(&preferred, &bundle.icon)
        });

        if skip_autostart {
            state.autostart_skipped = true;
        } else {
            let wrapped = resolver.wrapped(outcome).to_command();
            state.autostart_written = self.step("autostart entry", &mut warnings, || {
                self.write_autostart(&wrapped, &bundle.icon)
            });
        }

        state.shortcut_written = self.step("desktop shortcut", &mut warnings, || {
            self.write_shortcut(&preferred, &bundle.icon)
        });

        Integration {
            assets: bundle,
            state,
            warnings,
        }
    }

    fn step<F>(&self, what: &str, warnings: &mut Vec<String>, op: F) -> bool
    where
        F: FnOnce() -> Result<(), String>,
    {
        match op() {
            Ok(()) => true,
            Err(reason) => {
                warn!(step = what, %reason, "integration step failed");
                warnings.push(format!("could not create {what}: {reason}"));
                false
            }
        }
    }

    /// Copy sized icons into the hicolor theme; true when all were copied
    fn install_icons(&self, bundle: &AssetBundle, warnings: &mut Vec<String>) -> bool {
        let mut all_copied = true;
        for (size, source) in &bundle.sized_icons {
            let dest = assets::themed_icon_path(self.layout, self.package, *size);
            if let Err(e) = self.host.copy_file(source, &dest) {
                warnings.push(format!("could not install {size}x{size} icon: {e}"));
                all_copied = false;
            }
        }

        let refresh = CommandSpec::new("gtk-update-icon-cache").args([
            "-f".to_string(),
            "-t".to_string(),
            self.layout.icon_theme_dir().display().to_string(),
        ]);
        best_effort("icon cache refresh", || require_success(self.host.execute(&refresh)));

        all_copied
    }

    fn write_launcher(&self, launch: &CommandSpec, icon: &IconRef) -> Result<(), String> {
        let dir = self.layout.applications_dir();
        match self.layout.platform {
            Platform::Linux => {
                let path = dir.join(format!("{}.desktop", self.package.name));
                self.write_desktop_entry(&path, launch, icon, false)?;

                let refresh = CommandSpec::new("update-desktop-database")
                    .arg(dir.display().to_string());
                best_effort("desktop database refresh", || {
                    require_success(self.host.execute(&refresh))
                });
                Ok(())
            }
            Platform::Windows => {
                let link = dir.join(format!("{}.lnk", self.package.display_name));
                self.write_windows_shortcut(&link, launch, icon)
            }
        }
    }

    fn write_autostart(&self, wrapped: &CommandSpec, icon: &IconRef) -> Result<(), String> {
        let name = &self.package.name;
        match self.layout.platform {
            Platform::Linux => {
                let path = self.layout.autostart_dir().join(format!("{name}.desktop"));
                self.write_desktop_entry(&path, wrapped, icon, true)
            }
            Platform::Windows => {
                let batch = self
                    .layout
                    .app_data_dir(&self.package.display_name)
                    .join(format!("{name}-autostart.bat"));
                self.write(&batch, &entries::autostart_batch(wrapped))?;

                let shim = self.layout.autostart_dir().join(format!("{name}.vbs"));
                self.write(&shim, &entries::hidden_launcher(&batch))
            }
        }
    }

    fn write_shortcut(&self, launch: &CommandSpec, icon: &IconRef) -> Result<(), String> {
        let dir = &self.layout.desktop_dir;
        match self.layout.platform {
            Platform::Linux => {
                let path = dir.join(format!("{}.desktop", self.package.name));
                self.write_desktop_entry(&path, launch, icon, false)?;
                self.host
                    .make_executable(&path)
                    .map_err(|e| format!("{}: {e}", path.display()))?;

                // GNOME refuses to launch untrusted desktop files
                let trust = CommandSpec::new("gio").args([
                    "set".to_string(),
                    path.display().to_string(),
                    "metadata::trusted".to_string(),
                    "true".to_string(),
                ]);
                best_effort("shortcut trust", || require_success(self.host.execute(&trust)));
                Ok(())
            }
            Platform::Windows => {
                let link = dir.join(format!("{}.lnk", self.package.display_name));
                self.write_windows_shortcut(&link, launch, icon)
            }
        }
    }

    fn write_desktop_entry(
        &self,
        path: &Path,
        exec: &CommandSpec,
        icon: &IconRef,
        autostart: bool,
    ) -> Result<(), String> {
        let entry = DesktopEntry {
            package: self.package,
            exec,
            icon,
            autostart,
        };
        self.write(path, &entry.render())
    }

    fn write_windows_shortcut(
        &self,
        link: &Path,
        launch: &CommandSpec,
        icon: &IconRef,
    ) -> Result<(), String> {
        let command = entries::windows_shortcut(link, launch, icon, &self.package.comment);
        require_success(self.host.execute(&command)).map(|_| ())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), String> {
        self.host
            .write_file(path, contents)
            .map_err(|e| format!("{}: {e}", path.display()))
    }
}
