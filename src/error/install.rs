//! Package installation errors

use super::ProvisionError;

/// Creates an installation failed error carrying every attempted command
pub fn failed(
    package: impl Into<String>,
    attempts: Vec<String>,
    manual_command: impl Into<String>,
) -> ProvisionError {
    ProvisionError::InstallationFailed {
        package: package.into(),
        attempts,
        manual_command: manual_command.into(),
    }
}

/// Creates an invalid version error
pub fn invalid_version(version: impl Into<String>) -> ProvisionError {
    ProvisionError::InvalidVersion {
        version: version.into(),
    }
}
