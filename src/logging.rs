//! Diagnostic logging
//!
//! Events go to stderr so they never mix with the summary on stdout. The
//! filter comes from `RUST_LOG` when set; otherwise `-v` enables debug
//! events for the provisioner (which includes every swallowed probe
//! failure) and the default shows warnings only.

use tracing_subscriber::EnvFilter;

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "provisioner=debug"
    } else {
        "provisioner=warn"
    }
}

/// Install the global subscriber; later calls are ignored
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(true), "provisioner=debug");
        assert_eq!(default_directive(false), "provisioner=warn");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
