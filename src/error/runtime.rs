//! Runtime resolution errors

use super::ProvisionError;

/// Creates a runtime not found error carrying the probes that were tried
pub fn not_found(
    required: impl Into<String>,
    tried: Vec<String>,
    manual_command: impl Into<String>,
) -> ProvisionError {
    ProvisionError::RuntimeNotFound {
        required: required.into(),
        tried,
        manual_command: manual_command.into(),
    }
}
