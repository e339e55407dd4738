//! Target platform and its per-user filesystem layout
//!
//! This module handles:
//! - Platform identification (Linux-style freedesktop hosts vs. Windows)
//! - Per-user directory layout (via [`layout`])

use std::fmt;

pub mod layout;

pub use layout::Layout;

/// Operating system family the provisioner targets
///
/// Every non-Windows host is treated as a freedesktop (XDG) host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    /// Platform of the running process
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// File name of a console entry point for `name`
    pub fn executable_name(self, name: &str) -> String {
        match self {
            Platform::Linux => name.to_string(),
            Platform::Windows => format!("{name}.exe"),
        }
    }

    /// Icon reference used when the package ships no usable icon
    pub fn default_icon(self) -> &'static str {
        match self {
            Platform::Linux => "audio-input-microphone",
            Platform::Windows => "%SystemRoot%\\System32\\shell32.dll,168",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Linux => write!(f, "linux"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_name() {
        assert_eq!(Platform::Linux.executable_name("witticism"), "witticism");
        assert_eq!(Platform::Windows.executable_name("witticism"), "witticism.exe");
    }

    #[test]
    fn test_current_matches_target() {
        #[cfg(windows)]
        assert_eq!(Platform::current(), Platform::Windows);
        #[cfg(not(windows))]
        assert_eq!(Platform::current(), Platform::Linux);
    }

    #[test]
    fn test_display() {
        assert_eq!(Platform::Linux.to_string(), "linux");
        assert_eq!(Platform::Windows.to_string(), "windows");
    }
}
