//! Provisioner configuration (`config.yaml`)
//!
//! Every key is optional; omitted keys keep the built-in defaults, which
//! describe the Witticism package. The file is looked up at, in order:
//! - the `--config` flag (or `PROVISIONER_CONFIG`)
//! - `<user config dir>/provisioner/config.yaml`, when it exists

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, config as config_error};

/// Default configuration file name under the user's config directory
const CONFIG_DIR: &str = "provisioner";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionConfig {
    pub package: PackageConfig,
    pub runtime: RuntimeConfig,
    pub indexes: IndexConfig,
    pub verify: VerifyConfig,
}

/// The application package being installed
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
    /// Distribution name, also the console entry point name
    pub name: String,
    /// Importable module name
    pub module: String,
    pub display_name: String,
    pub comment: String,
    /// Freedesktop menu categories
    pub categories: Vec<String>,
    /// Square icon sizes shipped in the package assets, preferred first
    pub icon_sizes: Vec<u32>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: "witticism".to_string(),
            module: "witticism".to_string(),
            display_name: "Witticism".to_string(),
            comment: "WhisperX-powered voice transcription".to_string(),
            categories: vec![
                "AudioVideo".to_string(),
                "Audio".to_string(),
                "Utility".to_string(),
            ],
            icon_sizes: vec![256, 128, 64, 48],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Required `major.minor` interpreter version
    pub version: String,
    /// Full release fetched by the acquisition path
    pub installer_release: String,
    /// Installer download URL; `{release}` is substituted
    pub installer_url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            version: "3.12".to_string(),
            installer_release: "3.12.8".to_string(),
            installer_url: "https://www.python.org/ftp/python/{release}/python-{release}-amd64.exe"
                .to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn installer_url(&self) -> String {
        self.installer_url
            .replace("{release}", &self.installer_release)
    }
}

/// Package index URLs per acceleration tier
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    pub cpu: String,
    pub cuda_11_8: String,
    pub cuda_12_1: String,
    /// Extra index for dependencies the tier index does not carry
    pub fallback: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cpu: "https://download.pytorch.org/whl/cpu".to_string(),
            cuda_11_8: "https://download.pytorch.org/whl/cu118".to_string(),
            cuda_12_1: "https://download.pytorch.org/whl/cu121".to_string(),
            fallback: "https://pypi.org/simple".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifyConfig {
    pub timeout_secs: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl ProvisionConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str, origin: &Path) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
            .map_err(|e| config_error::parse_failed(origin.display().to_string(), e.to_string()))
    }

    /// Load configuration from an explicit path
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| config_error::read_failed(path.display().to_string(), e.to_string()))?;
        Self::from_yaml(&yaml, path)
    }

    /// Load from `explicit`, else from the default location when present, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// `<user config dir>/provisioner/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvisionError;
    use crate::test_fixtures::create_temp_dir;

    #[test]
    fn test_defaults_describe_witticism() {
        let config = ProvisionConfig::default();
        assert_eq!(config.package.name, "witticism");
        assert_eq!(config.runtime.version, "3.12");
        assert_eq!(config.verify.timeout_secs, 30);
        assert_eq!(config.package.icon_sizes, vec![256, 128, 64, 48]);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "runtime:\n  version: \"3.11\"\nverify:\n  timeout_secs: 5\n";
        let config = ProvisionConfig::from_yaml(yaml, Path::new("config.yaml")).unwrap();

        assert_eq!(config.runtime.version, "3.11");
        assert_eq!(config.runtime.installer_release, "3.12.8");
        assert_eq!(config.verify.timeout_secs, 5);
        assert_eq!(config.package, PackageConfig::default());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = ProvisionConfig::from_yaml("  \n", Path::new("config.yaml")).unwrap();
        assert_eq!(config, ProvisionConfig::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = ProvisionConfig::from_yaml("pakage:\n  name: x\n", Path::new("c.yaml"));
        assert!(matches!(
            result,
            Err(ProvisionError::ConfigParseFailed { .. })
        ));
    }

    #[test]
    fn test_installer_url_substitutes_release() {
        let runtime = RuntimeConfig::default();
        assert_eq!(
            runtime.installer_url(),
            "https://www.python.org/ftp/python/3.12.8/python-3.12.8-amd64.exe"
        );
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = create_temp_dir();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "package:\n  display_name: Witty\n").unwrap();

        let config = ProvisionConfig::load(Some(&path)).unwrap();

        assert_eq!(config.package.display_name, "Witty");
        assert_eq!(config.package.name, "witticism");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp = create_temp_dir();
        let result = ProvisionConfig::load(Some(&temp.path().join("nope.yaml")));
        assert!(matches!(
            result,
            Err(ProvisionError::ConfigReadFailed { .. })
        ));
    }
}
