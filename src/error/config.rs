//! Configuration errors

use super::ProvisionError;

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> ProvisionError {
    ProvisionError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a config read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> ProvisionError {
    ProvisionError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config value error
pub fn invalid_value(
    key: impl Into<String>,
    value: impl Into<String>,
    reason: impl Into<String>,
) -> ProvisionError {
    ProvisionError::ConfigInvalidValue {
        key: key.into(),
        value: value.into(),
        reason: reason.into(),
    }
}
