//! Image path resolution
//!
//! Service image paths are stored the way the service control manager wants
//! them: quoted, with arguments, with `%VAR%` references and with NT-style
//! prefixes such as `\SystemRoot\` or `\??\`. [`ImagePathResolver`] turns one
//! into a plain, lowercase, absolute path a [`FileProbe`](slb_catalog::FileProbe)
//! can answer for.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Leading part of an image path up to the first `.exe` / `.sys`
static BINARY_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^.*?\.(exe|sys)\b").unwrap()
});

/// `%NAME%` reference
static VARIABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%([^%]+)%").unwrap());

/// Prefix rewrite applied to a lowercased image path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathAlias {
    /// Prefix to match (case-insensitive)
    pub prefix: String,

    /// Text substituted for the prefix
    pub replacement: String,
}

impl PathAlias {
    /// Create alias
    #[must_use]
    pub fn new(prefix: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            replacement: replacement.into(),
        }
    }
}

/// Aliases for the NT path forms found in a stock service table
///
/// Applied in order, so `\??\\systemroot\...` resolves fully.
#[must_use]
pub fn default_aliases() -> Vec<PathAlias> {
    vec![
        PathAlias::new(r"\??\", ""),
        PathAlias::new(r"\systemroot\", r"c:\windows\"),
        PathAlias::new(r"system32\", r"c:\windows\system32\"),
    ]
}

/// Variables a stock installation defines for service image paths
#[must_use]
pub fn default_environment() -> BTreeMap<String, String> {
    [
        ("SystemRoot", r"C:\Windows"),
        ("windir", r"C:\Windows"),
        ("SystemDrive", "C:"),
        ("ProgramFiles", r"C:\Program Files"),
        ("ProgramFiles(x86)", r"C:\Program Files (x86)"),
        ("ProgramData", r"C:\ProgramData"),
        ("CommonProgramFiles", r"C:\Program Files\Common Files"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Why an image path could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// No `.exe` / `.sys` component
    #[error("image path match failed for {0:?}")]
    NoBinary(String),
}

/// Raw image path → absolute lowercase path
#[derive(Debug, Clone)]
pub struct ImagePathResolver {
    aliases: Vec<PathAlias>,
    variables: BTreeMap<String, String>,
}

impl Default for ImagePathResolver {
    fn default() -> Self {
        Self::new(default_aliases(), default_environment())
    }
}

impl ImagePathResolver {
    /// Create resolver with explicit aliases and variables
    ///
    /// Variable names are matched case-insensitively.
    #[must_use]
    pub fn new(aliases: Vec<PathAlias>, variables: BTreeMap<String, String>) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|a| PathAlias {
                prefix: a.prefix.to_lowercase(),
                replacement: a.replacement,
            })
            .collect();

        let variables = variables
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();

        Self { aliases, variables }
    }

    /// Resolve a raw image path
    pub fn resolve(&self, image_path: &str) -> Result<String, PathError> {
        let binary = BINARY_PATH
            .find(image_path)
            .ok_or_else(|| PathError::NoBinary(image_path.to_string()))?;

        let expanded = self.expand(binary.as_str()).to_lowercase();
        let mut path = expanded.strip_prefix('"').unwrap_or(&expanded).to_string();

        for alias in &self.aliases {
            if let Some(rest) = path.strip_prefix(alias.prefix.as_str()) {
                path = format!("{}{rest}", alias.replacement);
            }
        }

        Ok(path)
    }

    /// Expand `%NAME%` references; unknown names are left as written
    #[must_use]
    pub fn expand<'p>(&self, path: &'p str) -> Cow<'p, str> {
        VARIABLE.replace_all(path, |caps: &Captures<'_>| {
            self.variables
                .get(&caps[1].to_lowercase())
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
    }
}
