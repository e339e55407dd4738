//! Error types and handling for the provisioner
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`runtime`]: Language runtime resolution errors
//! - [`install`]: Package installation errors
//! - [`config`]: Configuration errors
//! - [`fs`]: File system and download errors
//!
//! Only [`ProvisionError::RuntimeNotFound`] and [`ProvisionError::InstallationFailed`]
//! abort a provisioning run. Everything below the stage level is either
//! degraded into a warning or swallowed by the probe chain that produced it.

pub mod config;
pub mod fs;
pub mod install;
pub mod runtime;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for provisioning operations
#[derive(Error, Diagnostic, Debug)]
pub enum ProvisionError {
    // Runtime errors
    #[error("Python {required} was not found on this machine")]
    #[diagnostic(
        code(provisioner::runtime::not_found),
        help("Install it manually, then re-run the provisioner: {manual_command}")
    )]
    RuntimeNotFound {
        required: String,
        tried: Vec<String>,
        manual_command: String,
    },

    // Install errors
    #[error("Failed to install '{package}'")]
    #[diagnostic(
        code(provisioner::install::failed),
        help("Retry the installation manually: {manual_command}")
    )]
    InstallationFailed {
        package: String,
        attempts: Vec<String>,
        manual_command: String,
    },

    #[error("Invalid package version: {version}")]
    #[diagnostic(
        code(provisioner::install::invalid_version),
        help("Versions look like 1.2.3 or 1.2.3rc1")
    )]
    InvalidVersion { version: String },

    // Configuration errors
    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(provisioner::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(
        code(provisioner::config::parse_failed),
        help("Check the YAML syntax and key names of the configuration file")
    )]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration value for {key}: '{value}' ({reason})")]
    #[diagnostic(code(provisioner::config::invalid_value))]
    ConfigInvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    // File system errors
    #[error("IO error: {message}")]
    #[diagnostic(code(provisioner::fs::io_error))]
    IoError { message: String },
}

impl ProvisionError {
    /// Remedies already attempted before giving up, for fatal errors
    pub fn attempted(&self) -> &[String] {
        match self {
            ProvisionError::RuntimeNotFound { tried, .. } => tried,
            ProvisionError::InstallationFailed { attempts, .. } => attempts,
            _ => &[],
        }
    }
}

impl From<std::io::Error> for ProvisionError {
    fn from(err: std::io::Error) -> Self {
        ProvisionError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ProvisionError {
    fn from(err: serde_yaml::Error) -> Self {
        ProvisionError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, ProvisionError>;
