//! Operations module
//!
//! This module provides the high-level provisioning workflow. The operation
//! coordinates with:
//! - Runtime: interpreter resolution (from runtime module)
//! - Capability: accelerator detection (from capability module)
//! - Installer: package installation (from installer module)
//! - Integration: launcher, autostart and shortcut entries (from integration module)
//! - Verify: post-install check (from verify module)
//! - UI: progress reporting (from ui module)

pub mod provision;

pub use provision::{ProvisionOperation, ProvisionOptions, ProvisionSummary};
