//! Per-user directory layout
//!
//! Uses the platform's standard locations (XDG on Linux, Known Folders on
//! Windows) via `dirs`. Tests build a layout rooted in a fake home with
//! [`Layout::rooted`].

use std::path::{Path, PathBuf};

use super::Platform;

/// Subdirectory of the user cache used for downloaded installers
const CACHE_DIR: &str = "provisioner";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub platform: Platform,
    pub home: PathBuf,
    /// `~/.local/share` on Linux, `%LOCALAPPDATA%` on Windows
    pub data_dir: PathBuf,
    /// `~/.config` on Linux, `%APPDATA%` on Windows
    pub config_dir: PathBuf,
    pub desktop_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl Layout {
    /// Layout of the current user, or `None` when no home directory is known
    pub fn detect() -> Option<Self> {
        let platform = Platform::current();
        let home = dirs::home_dir()?;
        let fallback = Self::rooted(platform, &home);

        Some(Self {
            platform,
            data_dir: dirs::data_local_dir().unwrap_or(fallback.data_dir),
            config_dir: dirs::config_dir().unwrap_or(fallback.config_dir),
            desktop_dir: dirs::desktop_dir().unwrap_or(fallback.desktop_dir),
            cache_dir: dirs::cache_dir()
                .map(|d| d.join(CACHE_DIR))
                .unwrap_or(fallback.cache_dir),
            home,
        })
    }

    /// Conventional layout below `home`
    pub fn rooted(platform: Platform, home: &Path) -> Self {
        let (data_dir, config_dir, cache_dir) = match platform {
            Platform::Linux => (
                home.join(".local").join("share"),
                home.join(".config"),
                home.join(".cache").join(CACHE_DIR),
            ),
            Platform::Windows => {
                let app_data = home.join("AppData");
                (
                    app_data.join("Local"),
                    app_data.join("Roaming"),
                    app_data.join("Local").join(CACHE_DIR),
                )
            }
        };

        Self {
            platform,
            home: home.to_path_buf(),
            data_dir,
            config_dir,
            desktop_dir: home.join("Desktop"),
            cache_dir,
        }
    }

    fn start_menu_programs(&self) -> PathBuf {
        self.config_dir
            .join("Microsoft")
            .join("Windows")
            .join("Start Menu")
            .join("Programs")
    }

    /// Per-user application launcher registration directory
    pub fn applications_dir(&self) -> PathBuf {
        match self.platform {
            Platform::Linux => self.data_dir.join("applications"),
            Platform::Windows => self.start_menu_programs(),
        }
    }

    /// Per-user startup directory
    pub fn autostart_dir(&self) -> PathBuf {
        match self.platform {
            Platform::Linux => self.config_dir.join("autostart"),
            Platform::Windows => self.start_menu_programs().join("Startup"),
        }
    }

    /// Per-user hicolor icon theme root (freedesktop only)
    pub fn icon_theme_dir(&self) -> PathBuf {
        self.data_dir.join("icons").join("hicolor")
    }

    /// Directory where user-level console entry points land
    pub fn user_bin_dir(&self) -> PathBuf {
        self.home.join(".local").join("bin")
    }

    /// Private data directory for files the provisioner owns
    pub fn app_data_dir(&self, app_name: &str) -> PathBuf {
        self.data_dir.join(app_name)
    }

    /// Historically known isolation (pipx) venv roots, most likely first
    pub fn isolation_roots(&self) -> Vec<PathBuf> {
        match self.platform {
            Platform::Linux => vec![
                self.data_dir.join("pipx").join("venvs"),
                self.home.join(".local").join("pipx").join("venvs"),
            ],
            Platform::Windows => vec![
                self.home.join("pipx").join("venvs"),
                self.data_dir.join("pipx").join("pipx").join("venvs"),
                self.home.join(".local").join("pipx").join("venvs"),
            ],
        }
    }

    /// site-packages directory inside a virtual environment
    pub fn venv_site_packages(&self, venv: &Path, major: u32, minor: u32) -> PathBuf {
        match self.platform {
            Platform::Linux => venv
                .join("lib")
                .join(format!("python{major}.{minor}"))
                .join("site-packages"),
            Platform::Windows => venv.join("Lib").join("site-packages"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_layout() {
        let layout = Layout::rooted(Platform::Linux, Path::new("/home/u"));
        assert_eq!(
            layout.applications_dir(),
            PathBuf::from("/home/u/.local/share/applications")
        );
        assert_eq!(layout.autostart_dir(), PathBuf::from("/home/u/.config/autostart"));
        assert_eq!(
            layout.icon_theme_dir(),
            PathBuf::from("/home/u/.local/share/icons/hicolor")
        );
        assert_eq!(layout.user_bin_dir(), PathBuf::from("/home/u/.local/bin"));
    }

    #[test]
    fn test_linux_isolation_roots_order() {
        let layout = Layout::rooted(Platform::Linux, Path::new("/home/u"));
        assert_eq!(
            layout.isolation_roots(),
            vec![
                PathBuf::from("/home/u/.local/share/pipx/venvs"),
                PathBuf::from("/home/u/.local/pipx/venvs"),
            ]
        );
    }

    #[test]
    fn test_windows_startup_is_inside_start_menu() {
        let layout = Layout::rooted(Platform::Windows, Path::new("C:\\Users\\u"));
        assert!(layout.autostart_dir().starts_with(layout.applications_dir()));
        assert!(layout.autostart_dir().ends_with("Startup"));
    }

    #[test]
    fn test_windows_isolation_roots_count() {
        let layout = Layout::rooted(Platform::Windows, Path::new("C:\\Users\\u"));
        assert_eq!(layout.isolation_roots().len(), 3);
    }

    #[test]
    fn test_venv_site_packages() {
        let linux = Layout::rooted(Platform::Linux, Path::new("/home/u"));
        assert_eq!(
            linux.venv_site_packages(Path::new("/v"), 3, 12),
            PathBuf::from("/v/lib/python3.12/site-packages")
        );

        let windows = Layout::rooted(Platform::Windows, Path::new("/h"));
        assert_eq!(
            windows.venv_site_packages(Path::new("/v"), 3, 12),
            PathBuf::from("/v/Lib/site-packages")
        );
    }
}
