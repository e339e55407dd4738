//! `major.minor` interpreter versions

use std::fmt;

/// Interpreter version as far as compatibility is concerned.
///
/// Matching is exact on `major.minor`; patch releases are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
}

impl RuntimeVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse `3.12`, `3.12.4` or `3.13.0rc1`
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = leading_number(parts.next()?)?;
        Some(Self { major, minor })
    }

    /// Find the version in `--version` output such as `Python 3.12.4`
    pub fn from_version_output(output: &str) -> Option<Self> {
        output
            .split_whitespace()
            .filter(|token| token.starts_with(|c: char| c.is_ascii_digit()))
            .find_map(Self::parse)
    }

    /// Digits without the dot, as used in installation directory names
    pub fn compact(&self) -> String {
        format!("{}{}", self.major, self.minor)
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn leading_number(text: &str) -> Option<u32> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}
