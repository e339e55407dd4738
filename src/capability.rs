//! Hardware acceleration detection
//!
//! Maps the CUDA version reported by the NVIDIA driver to the package index
//! tier the ML dependencies are installed from. Nothing here is fatal: a
//! missing driver, a failing probe or unreadable output all mean CPU.

use std::fmt;

use tracing::{debug, info};

use crate::config::IndexConfig;
use crate::host::{CommandSpec, Host};

/// Driver probe command
const DRIVER_PROBE: &str = "nvidia-smi";

/// Marker preceding the CUDA version in the driver probe output
const CUDA_MARKER: &str = "CUDA Version:";

/// Marker preceding the driver's own version, never a CUDA version
const DRIVER_MARKER: &str = "Driver Version:";

/// Dependency index tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKey {
    Cpu,
    Cuda118,
    Cuda121,
}

impl IndexKey {
    /// Tier for a CUDA `major.minor` version
    pub fn for_cuda(major: u32, minor: u32) -> Self {
        match (major, minor) {
            v if v >= (12, 1) => IndexKey::Cuda121,
            v if v >= (11, 8) => IndexKey::Cuda118,
            _ => IndexKey::Cpu,
        }
    }

    /// Tier for raw driver probe output; unreadable output means CPU
    pub fn from_probe_output(output: &str) -> Self {
        parse_cuda_version(output).map_or(IndexKey::Cpu, |(major, minor)| {
            Self::for_cuda(major, minor)
        })
    }

    pub fn index_url(self, indexes: &IndexConfig) -> &str {
        match self {
            IndexKey::Cpu => &indexes.cpu,
            IndexKey::Cuda118 => &indexes.cuda_11_8,
            IndexKey::Cuda121 => &indexes.cuda_12_1,
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Cpu => write!(f, "cpu"),
            IndexKey::Cuda118 => write!(f, "cuda-11.8"),
            IndexKey::Cuda121 => write!(f, "cuda-12.1"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccelerationProfile {
    pub available: bool,
    pub driver_version_string: Option<String>,
    pub selected_index_key: IndexKey,
}

impl AccelerationProfile {
    pub fn cpu() -> Self {
        Self {
            available: false,
            driver_version_string: None,
            selected_index_key: IndexKey::Cpu,
        }
    }
}

/// Find the CUDA `major.minor` in driver probe output.
///
/// When `CUDA Version:` is present only the token right after it counts,
/// so `CUDA Version: N/A` yields `None`. Without the marker the first
/// `N.N` token is used, skipping the one after `Driver Version:`.
pub fn parse_cuda_version(output: &str) -> Option<(u32, u32)> {
    if let Some(i) = output.find(CUDA_MARKER) {
        let token = output[i + CUDA_MARKER.len()..]
            .lines()
            .next()?
            .split_whitespace()
            .next()?;
        return parse_major_minor(token.trim_end_matches(|c: char| !c.is_ascii_digit()));
    }

    output
        .lines()
        .map(without_driver_version)
        .find_map(|line| first_version_token(&line))
}

fn without_driver_version(line: &str) -> String {
    match line.find(DRIVER_MARKER) {
        Some(i) => {
            let rest = line[i + DRIVER_MARKER.len()..].trim_start();
            let after = rest.split_once(char::is_whitespace).map_or("", |(_, r)| r);
            format!("{} {after}", &line[..i])
        }
        None => line.to_string(),
    }
}

fn first_version_token(text: &str) -> Option<(u32, u32)> {
    text.split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .find_map(parse_major_minor)
}

fn parse_major_minor(token: &str) -> Option<(u32, u32)> {
    let mut parts = token.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

pub struct CapabilityDetector<'a> {
    host: &'a dyn Host,
}

impl<'a> CapabilityDetector<'a> {
    pub fn new(host: &'a dyn Host) -> Self {
        Self { host }
    }

    pub fn detect(&self, force_cpu: bool) -> AccelerationProfile {
        if force_cpu {
            info!("cpu tier forced");
            return AccelerationProfile::cpu();
        }

        let output = match self.host.probe(&CommandSpec::new(DRIVER_PROBE)) {
            Ok(output) if output.success => output,
            Ok(output) => {
                debug!(code = ?output.code, "driver probe exited non-zero");
                return AccelerationProfile::cpu();
            }
            Err(e) => {
                debug!(error = %e, "driver probe unavailable");
                return AccelerationProfile::cpu();
            }
        };

        let Some((major, minor)) = parse_cuda_version(&output.stdout) else {
            debug!("driver probe output has no version");
            return AccelerationProfile::cpu();
        };

        let selected_index_key = IndexKey::for_cuda(major, minor);
        info!(cuda = %format!("{major}.{minor}"), tier = %selected_index_key, "accelerator detected");

        AccelerationProfile {
            available: true,
            driver_version_string: Some(format!("{major}.{minor}")),
            selected_index_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::CommandOutput;
    use crate::test_fixtures::FakeHost;

    const SMI_HEADER: &str = "\
+-----------------------------------------------------------------------------+
| NVIDIA-SMI 550.54.14    Driver Version: 550.54.14    CUDA Version: 12.4     |
|-------------------------------+----------------------+----------------------+";

    #[test]
    fn test_threshold_table() {
        assert_eq!(IndexKey::for_cuda(12, 4), IndexKey::Cuda121);
        assert_eq!(IndexKey::for_cuda(12, 1), IndexKey::Cuda121);
        assert_eq!(IndexKey::for_cuda(13, 0), IndexKey::Cuda121);
        assert_eq!(IndexKey::for_cuda(12, 0), IndexKey::Cuda118);
        assert_eq!(IndexKey::for_cuda(11, 8), IndexKey::Cuda118);
        assert_eq!(IndexKey::for_cuda(11, 7), IndexKey::Cpu);
        assert_eq!(IndexKey::for_cuda(10, 2), IndexKey::Cpu);
    }

    #[test]
    fn test_minor_compared_as_integer() {
        // 11.10 is newer than 11.8
        assert_eq!(IndexKey::for_cuda(11, 10), IndexKey::Cuda118);
        assert_eq!(IndexKey::from_probe_output("CUDA Version: 12.10"), IndexKey::Cuda121);
    }

    #[test]
    fn test_parse_prefers_cuda_marker() {
        // The driver version 550.54 comes first but is not the CUDA version
        assert_eq!(parse_cuda_version(SMI_HEADER), Some((12, 4)));
    }

    #[test]
    fn test_parse_falls_back_to_first_token() {
        assert_eq!(parse_cuda_version("release 11.8, V11.8.89"), Some((11, 8)));
    }

    #[test]
    fn test_cuda_not_available_is_cpu() {
        let output = "| NVIDIA-SMI 550.54.14  Driver Version: 550.54.14  CUDA Version: N/A |";
        assert_eq!(parse_cuda_version(output), None);
        assert_eq!(IndexKey::from_probe_output(output), IndexKey::Cpu);
    }

    #[test]
    fn test_fallback_ignores_driver_version() {
        assert_eq!(parse_cuda_version("Driver Version: 550.54.14"), None);
        assert_eq!(
            parse_cuda_version("Driver Version: 535.104.05\nnvcc release 11.8"),
            Some((11, 8))
        );
    }

    #[test]
    fn test_unparsable_output_is_cpu() {
        assert_eq!(parse_cuda_version("No devices were found"), None);
        assert_eq!(IndexKey::from_probe_output("No devices were found"), IndexKey::Cpu);
        assert_eq!(IndexKey::from_probe_output(""), IndexKey::Cpu);
    }

    #[test]
    fn test_index_key_display() {
        assert_eq!(IndexKey::Cpu.to_string(), "cpu");
        assert_eq!(IndexKey::Cuda118.to_string(), "cuda-11.8");
        assert_eq!(IndexKey::Cuda121.to_string(), "cuda-12.1");
    }

    #[test]
    fn test_index_url() {
        let indexes = IndexConfig::default();
        assert_eq!(
            IndexKey::Cuda121.index_url(&indexes),
            "https://download.pytorch.org/whl/cu121"
        );
        assert_eq!(
            IndexKey::Cpu.index_url(&indexes),
            "https://download.pytorch.org/whl/cpu"
        );
    }

    #[test]
    fn test_detect_cuda_12_4_selects_cuda_12_1() {
        let host = FakeHost::new().respond("nvidia-smi", CommandOutput::ok("CUDA Version: 12.4"));

        let profile = CapabilityDetector::new(&host).detect(false);

        assert!(profile.available);
        assert_eq!(profile.driver_version_string.as_deref(), Some("12.4"));
        assert_eq!(profile.selected_index_key, IndexKey::Cuda121);
    }

    #[test]
    fn test_detect_without_driver_is_cpu() {
        let host = FakeHost::new();

        let profile = CapabilityDetector::new(&host).detect(false);

        assert_eq!(profile, AccelerationProfile::cpu());
    }

    #[test]
    fn test_detect_failing_probe_is_cpu() {
        let host = FakeHost::new().respond("nvidia-smi", CommandOutput::failed(9));

        let profile = CapabilityDetector::new(&host).detect(false);

        assert_eq!(profile.selected_index_key, IndexKey::Cpu);
    }

    #[test]
    fn test_force_cpu_skips_probe() {
        let host = FakeHost::new().respond("nvidia-smi", CommandOutput::ok("CUDA Version: 12.4"));

        let profile = CapabilityDetector::new(&host).detect(true);

        assert_eq!(profile.selected_index_key, IndexKey::Cpu);
        assert!(host.probes().is_empty());
    }
}
