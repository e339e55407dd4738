//! Asset discovery and icon resolution
//!
//! Where the installed package keeps its `assets/` directory depends on how it
//! was installed, so discovery branches on [`InstallMode`]. Icon resolution
//! always ends with either a file on disk or the platform's default icon.

use std::fmt;
use std::path::PathBuf;

use crate::config::PackageConfig;
use crate::host::{Host, require_success};
use crate::installer::{InstallMode, InstallOutcome, pipx, query_user_site};
use crate::platform::{Layout, Platform};
use crate::probe::{best_effort, first_match};
use crate::runtime::RuntimeCandidate;

/// Icon used by launcher entries and shortcuts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconRef {
    File(PathBuf),
    /// Icon name or resource understood by the desktop environment
    PlatformDefault(&'static str),
}

impl IconRef {
    pub fn is_file(&self) -> bool {
        matches!(self, IconRef::File(_))
    }
}

impl fmt::Display for IconRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IconRef::File(path) => write!(f, "{}", path.display()),
            IconRef::PlatformDefault(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBundle {
    /// The package's assets directory, when found
    pub root: Option<PathBuf>,
    /// Sized icons present in `root`, as `(size, path)`
    pub sized_icons: Vec<(u32, PathBuf)>,
    pub icon: IconRef,
}

/// Candidate assets directories for `outcome`, most likely first
pub fn asset_candidates(
    host: &dyn Host,
    layout: &Layout,
    runtime: &RuntimeCandidate,
    package: &PackageConfig,
    outcome: &InstallOutcome,
) -> Vec<PathBuf> {
    match outcome.mode {
        InstallMode::Direct => outcome
            .package_root
            .clone()
            .or_else(|| query_user_site(host, runtime))
            .map(|site| site.join(&package.module).join("assets"))
            .into_iter()
            .collect(),
        InstallMode::Isolated => {
            let Some(version) = runtime.version() else {
                return Vec::new();
            };
            isolation_roots(host, layout, runtime)
                .into_iter()
                .map(|root| {
                    layout
                        .venv_site_packages(&root.join(&package.name), version.major, version.minor)
                        .join(&package.module)
                        .join("assets")
                })
                .collect()
        }
    }
}

/// Venv roots reported by pipx, else the historically known ones
fn isolation_roots(host: &dyn Host, layout: &Layout, runtime: &RuntimeCandidate) -> Vec<PathBuf> {
    let query = pipx(runtime).args(["environment", "--value", "PIPX_LOCAL_VENVS"]);
    best_effort("pipx venv root query", || require_success(host.probe(&query)))
        .and_then(|output| output.first_line().map(PathBuf::from))
        .map_or_else(|| layout.isolation_roots(), |root| vec![root])
}

/// Icon file names in the order they are preferred
pub fn icon_names(package: &PackageConfig, platform: Platform) -> Vec<(Option<u32>, String)> {
    let name = &package.name;
    let mut names: Vec<(Option<u32>, String)> = package
        .icon_sizes
        .iter()
        .map(|&size| (Some(size), format!("{name}_{size}x{size}.png")))
        .collect();
    let canonical = match platform {
        Platform::Linux => format!("{name}.png"),
        Platform::Windows => format!("{name}.ico"),
    };
    names.push((None, canonical));
    names
}

/// Locate the assets directory and pick an icon from it
pub fn discover(
    host: &dyn Host,
    layout: &Layout,
    package: &PackageConfig,
    candidates: Vec<PathBuf>,
) -> AssetBundle {
    let root = first_match("assets directory", candidates, |dir| {
        host.exists(dir).then(|| dir.clone())
    });
    let fallback = IconRef::PlatformDefault(layout.platform.default_icon());

    let Some(dir) = &root else {
        return AssetBundle {
            root,
            sized_icons: Vec::new(),
            icon: fallback,
        };
    };

    let names = icon_names(package, layout.platform);
    let sized_icons = names
        .iter()
        .filter_map(|(size, name)| size.map(|s| (s, dir.join(name))))
        .filter(|(_, path)| host.exists(path))
        .collect();
    let icon = first_match("icon", names, |(_, name)| {
        let path = dir.join(name);
        host.exists(&path).then_some(path)
    })
    .map_or(fallback, IconRef::File);

    AssetBundle {
        root,
        sized_icons,
        icon,
    }
}

/// Destination of a sized icon in the user's hicolor theme
pub fn themed_icon_path(layout: &Layout, package: &PackageConfig, size: u32) -> PathBuf {
    layout
        .icon_theme_dir()
        .join(format!("{size}x{size}"))
        .join("apps")
        .join(format!("{}.png", package.name))
}
