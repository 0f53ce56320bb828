//! Error handling types and utilities.

use std::path::PathBuf;

/// A specialized Result type for rustdoc-registry operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods throughout the codebase.
pub type Result<T> = anyhow::Result<T>;

/// A crate or trait name that cannot be used as a registry key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidName {
    #[error("name is empty")]
    Empty,
    #[error("'{0}' is not a valid crate name")]
    Crate(String),
    #[error("'{0}' is not a valid trait path")]
    TraitPath(String),
}

/// A description shard whose length table does not partition its payload.
///
/// Registration never reports these. They are producer contract violations,
/// surfaced only by [`DescriptorShard::validate`](crate::shard::DescriptorShard::validate).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShardError {
    #[error(
        "shard {crate_name}#{shard_index}: start offset {start_offset} plus fragment lengths {fragments} != payload length {payload}"
    )]
    LengthMismatch {
        crate_name: String,
        shard_index: u32,
        start_offset: usize,
        fragments: usize,
        payload: usize,
    },
    #[error("shard {crate_name}#{shard_index}: fragment {fragment} starts inside a UTF-8 character at byte {offset}")]
    SplitInsideChar {
        crate_name: String,
        shard_index: u32,
        fragment: usize,
        offset: usize,
    },
}

/// A static site file whose name or wrapper does not follow the rustdoc layout.
#[derive(Debug, thiserror::Error)]
pub enum FileFormatError {
    #[error("'{0}' is not a description shard file name (expected `<crate>-desc-<N>-.js`)")]
    ShardFileName(String),
    #[error("{} is not a trait implementor file (expected `trait.impl/<path>/trait.<Name>.js`)", .0.display())]
    TraitImplPath(PathBuf),
    #[error("missing `{0}` call")]
    MissingCall(&'static str),
    #[error("malformed implementor entry: {0}")]
    MalformedEntry(String),
    #[error("fragment table covers {expected} UTF-16 units but the file only has {actual}")]
    FragmentTableOutOfRange { expected: usize, actual: usize },
    #[error(transparent)]
    InvalidName(#[from] InvalidName),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error returned when a single site file fails to load.
///
/// A failed file is skipped; the rest of the site keeps loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file was read but its content is malformed.
    #[error("failed to parse {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FileFormatError,
    },
}

impl LoadError {
    /// The file that failed to load.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Format { path, .. } => path,
        }
    }
}
