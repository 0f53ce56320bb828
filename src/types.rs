//! Registry key newtypes.

use crate::error::InvalidName;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::LazyLock;

static CRATE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("crate name pattern is valid"));

static TRAIT_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("path segment pattern is valid"));

/// Name of a documented crate, as it appears in rustdoc output (`rustls_pki_types`).
///
/// Conversions from `&str`/`String` do not validate: producer output is trusted.
/// Use [`CrateName::parse`] for names coming from users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrateName(String);

impl CrateName {
    /// Validate and wrap a user-supplied crate name.
    pub fn parse(name: &str) -> Result<Self, InvalidName> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InvalidName::Empty);
        }
        if !CRATE_NAME.is_match(name) {
            return Err(InvalidName::Crate(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CrateName {
    fn from(name: &str) -> Self {
        Self::new_unchecked(name)
    }
}

impl From<String> for CrateName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for CrateName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CrateName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CrateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully qualified trait path, e.g. `core::ops::deref::Deref`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitPath(String);

impl TraitPath {
    /// Validate a `::`-separated path. Every segment must be an identifier.
    pub fn parse(path: &str) -> Result<Self, InvalidName> {
        let path = path.trim();
        if path.is_empty() {
            return Err(InvalidName::Empty);
        }
        if !path.split("::").all(|segment| TRAIT_SEGMENT.is_match(segment)) {
            return Err(InvalidName::TraitPath(path.to_string()));
        }
        Ok(Self(path.to_string()))
    }

    /// Build a path from already-validated segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("::");
        Self(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bare trait name (last path segment).
    pub fn name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }

    /// The crate the trait is defined in (first path segment).
    pub fn defining_crate(&self) -> &str {
        self.0.split("::").next().unwrap_or(&self.0)
    }
}

impl From<&str> for TraitPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl Borrow<str> for TraitPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[rstest]
    #[case("ring", true)]
    #[case("hyper_rustls", true)]
    #[case("rustdoc-registry", true)]
    #[case("../etc", false)]
    #[case("foo bar", false)]
    fn test_crate_name_parse(#[case] input: &str, #[case] valid: bool) {
        check!(CrateName::parse(input).is_ok() == valid);
    }

    #[test]
    fn test_crate_name_empty() {
        let_assert!(Err(err) = CrateName::parse("   "));
        check!(err == InvalidName::Empty);
    }

    #[rstest]
    #[case("core::ops::deref::Deref", "Deref", "core")]
    #[case("Send", "Send", "Send")]
    fn test_trait_path_segments(
        #[case] input: &str,
        #[case] name: &str,
        #[case] defining_crate: &str,
    ) {
        let_assert!(Ok(path) = TraitPath::parse(input));
        check!(path.name() == name);
        check!(path.defining_crate() == defining_crate);
    }

    #[rstest]
    #[case("core::::Deref")]
    #[case("core::ops::Deref<T>")]
    fn test_trait_path_rejects_malformed(#[case] input: &str) {
        let_assert!(Err(InvalidName::TraitPath(_)) = TraitPath::parse(input));
    }

    #[test]
    fn test_from_segments() {
        let path = TraitPath::from_segments(["core", "ops", "deref", "Deref"]);
        check!(path.as_str() == "core::ops::deref::Deref");
    }
}
