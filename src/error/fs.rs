//! File system errors

use super::ProvisionError;

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> ProvisionError {
    ProvisionError::IoError {
        message: message.into(),
    }
}
