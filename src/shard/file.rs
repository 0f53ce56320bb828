//! `search.desc/<crate>/<crate>-desc-<N>-.js` files.
//!
//! Each file is a single call:
//!
//! ```text
//! searchState.loadedDescShard("ring", 0, "Feature Flags\nAuthenticated Encryption…")
//! ```
//!
//! The third argument holds the shard's descriptions separated by newlines.
//! Loading turns it into a [`DescriptorShard`] with one fragment per
//! description, so lookups slice instead of splitting.

use super::DescriptorShard;
use crate::error::FileFormatError;
use crate::types::CrateName;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Directory under the doc root holding all description shards.
pub const SEARCH_DESC_DIR: &str = "search.desc";

const LOADER_CALL: &str = "searchState.loadedDescShard";

static SHARD_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)^\s*searchState\.loadedDescShard\(\s*("(?:[^"\\]|\\.)*")\s*,\s*(\d+)\s*,\s*("(?:[^"\\]|\\.)*")\s*\)\s*;?\s*$"#,
    )
    .expect("shard call pattern is valid")
});

/// The `(crate, shard index)` pair encoded in a shard file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShardFileName {
    pub crate_name: CrateName,
    pub shard_index: u32,
}

impl ShardFileName {
    pub fn new(crate_name: impl Into<CrateName>, shard_index: u32) -> Self {
        Self {
            crate_name: crate_name.into(),
            shard_index,
        }
    }

    /// Parse a bare file name such as `ring-desc-0-.js`.
    pub fn parse(file_name: &str) -> Result<Self, FileFormatError> {
        let invalid = || FileFormatError::ShardFileName(file_name.to_string());

        let stem = file_name.strip_suffix("-.js").ok_or_else(invalid)?;
        let (crate_name, index) = stem.rsplit_once("-desc-").ok_or_else(invalid)?;
        let shard_index = index.parse().map_err(|_| invalid())?;
        let crate_name = CrateName::parse(crate_name).map_err(|_| invalid())?;

        Ok(Self {
            crate_name,
            shard_index,
        })
    }

    /// Parse the file name component of `path`.
    pub fn from_path(path: &Path) -> Result<Self, FileFormatError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| FileFormatError::ShardFileName(path.display().to_string()))?;
        Self::parse(file_name)
    }

    /// Location relative to the doc root: `search.desc/<crate>/<file>`.
    pub fn relative_path(&self) -> PathBuf {
        Path::new(SEARCH_DESC_DIR)
            .join(self.crate_name.as_str())
            .join(self.to_string())
    }
}

impl fmt::Display for ShardFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-desc-{}-.js", self.crate_name, self.shard_index)
    }
}

/// Parse the content of a shard file.
///
/// The crate name and shard index are taken from the call itself, so the file
/// is self-contained regardless of where it was found.
pub fn parse_shard_file(content: &str) -> Result<DescriptorShard, FileFormatError> {
    let captures = SHARD_CALL
        .captures(content)
        .ok_or(FileFormatError::MissingCall(LOADER_CALL))?;

    let crate_name: String = serde_json::from_str(&captures[1])?;
    let crate_name = CrateName::parse(&crate_name)?;
    let shard_index: u32 = captures[2]
        .parse()
        .map_err(|_| FileFormatError::MissingCall(LOADER_CALL))?;
    let descriptions: String = serde_json::from_str(&captures[3])?;

    Ok(DescriptorShard::from_descriptions(
        crate_name,
        shard_index,
        "",
        descriptions.split('\n'),
    ))
}

/// Render a shard file for `descriptions` (the producer side of
/// [`parse_shard_file`]). Descriptions must not contain newlines.
pub fn render_shard_file<I, S>(
    name: &ShardFileName,
    descriptions: I,
) -> Result<String, FileFormatError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = descriptions
        .into_iter()
        .map(|d| d.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(format!(
        "{}({}, {}, {})",
        LOADER_CALL,
        serde_json::to_string(name.crate_name.as_str())?,
        name.shard_index,
        serde_json::to_string(&joined)?
    ))
}
