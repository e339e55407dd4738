//! Package requirement (`name` or `name==version`)

use crate::error::{Result, install as install_error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
}

impl PackageSpec {
    /// Create a spec, validating the pinned version if any
    pub fn new(name: impl Into<String>, version: Option<&str>) -> Result<Self> {
        let version = match version.map(str::trim) {
            None | Some("") => None,
            Some(v) if is_valid_version(v) => Some(v.to_string()),
            Some(v) => return Err(install_error::invalid_version(v)),
        };
        Ok(Self {
            name: name.into(),
            version,
        })
    }

    /// Requirement string understood by pip and pipx
    pub fn requirement(&self) -> String {
        match &self.version {
            Some(version) => format!("{}=={}", self.name, version),
            None => self.name.clone(),
        }
    }
}

/// `MAJOR.MINOR[.PATCH...]` with an optional pre/post/local suffix
fn is_valid_version(version: &str) -> bool {
    let split = version
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(version.len());
    let (release, suffix) = version.split_at(split);

    let components: Vec<&str> = release.split('.').collect();
    let release_ok = components.len() >= 2 && components.iter().all(|c| !c.is_empty());
    let suffix_ok = suffix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'));

    release_ok && suffix_ok
}
