//! Loading a rustdoc output directory into the registries.
//!
//! Files are discovered up front, then read and registered concurrently. The
//! order in which they land is whatever the filesystem and scheduler produce;
//! both registries are built to give the same result for any order.

use crate::error::{FileFormatError, LoadError, Result};
use crate::implementors::file::TRAIT_IMPL_DIR;
use crate::implementors::{ImplementorBatch, ImplementorRegistry, TraitImplFile, trait_path_from_relative};
use crate::shard::file::SEARCH_DESC_DIR;
use crate::shard::{DescriptorShard, ShardFileName, ShardStore, parse_shard_file};
use crate::types::TraitPath;
use anyhow::Context;
use futures::stream::{self, StreamExt};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// All session state: description shards and trait implementors.
///
/// Created empty, only ever added to.
#[derive(Debug, Default)]
pub struct DocSite {
    pub shards: ShardStore,
    pub implementors: ImplementorRegistry,
}

/// Handle passed to everything that reads or writes the site.
pub type SharedSite = Arc<RwLock<DocSite>>;

impl DocSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedSite {
        Arc::new(RwLock::new(Self::new()))
    }
}

/// A loadable file found under the doc root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteFile {
    DescShard {
        path: PathBuf,
        name: ShardFileName,
    },
    TraitImpl {
        path: PathBuf,
        trait_path: TraitPath,
    },
}

impl SiteFile {
    pub fn path(&self) -> &Path {
        match self {
            Self::DescShard { path, .. } | Self::TraitImpl { path, .. } => path,
        }
    }

    /// Classify `path` (somewhere under `root`). Unrelated files give `None`.
    pub fn classify(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        if path.extension().and_then(|ext| ext.to_str()) != Some("js") {
            return None;
        }

        if let Ok(rest) = relative.strip_prefix(SEARCH_DESC_DIR) {
            return match ShardFileName::from_path(rest) {
                Ok(name) => Some(Self::DescShard {
                    path: path.to_path_buf(),
                    name,
                }),
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", path.display(), e);
                    None
                }
            };
        }

        if let Ok(rest) = relative.strip_prefix(TRAIT_IMPL_DIR) {
            return match trait_path_from_relative(rest) {
                Ok(trait_path) => Some(Self::TraitImpl {
                    path: path.to_path_buf(),
                    trait_path,
                }),
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", path.display(), e);
                    None
                }
            };
        }

        None
    }
}

/// What a single file contributed once parsed.
#[derive(Debug)]
pub enum LoadedFile {
    Shard(DescriptorShard),
    Implementors(ImplementorBatch),
}

/// Outcome of loading a whole site.
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub shards: usize,
    pub implementor_files: usize,
    pub failures: Vec<LoadError>,
}

/// Find every description shard and trait implementor file under `root`.
///
/// Returned in sorted path order; loading does not rely on it.
pub async fn discover(root: &Path) -> Result<Vec<SiteFile>> {
    if !root.is_dir() {
        anyhow::bail!("Doc root is not a directory: {}", root.display());
    }

    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || {
        // rustdoc output usually lives under an ignored `target/`
        let mut files: Vec<_> = WalkBuilder::new(&root)
            .standard_filters(false)
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .filter_map(|entry| SiteFile::classify(&root, entry.path()))
            .collect();

        files.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(files)
    })
    .await
    .context("Task panicked")?
}

/// Read and parse one file without touching the registries.
pub async fn read_file(file: &SiteFile) -> std::result::Result<LoadedFile, LoadError> {
    let path = file.path();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let format_error = |source: FileFormatError| LoadError::Format {
        path: path.to_path_buf(),
        source,
    };

    match file {
        SiteFile::DescShard { name, .. } => {
            let shard = parse_shard_file(&content).map_err(format_error)?;
            if shard.crate_name() != &name.crate_name || shard.shard_index() != name.shard_index {
                tracing::warn!(
                    "{} declares shard {}#{}, trusting the content",
                    path.display(),
                    shard.crate_name(),
                    shard.shard_index()
                );
            }
            Ok(LoadedFile::Shard(shard))
        }
        SiteFile::TraitImpl { trait_path, .. } => {
            let batch = TraitImplFile::new(trait_path.clone(), content)
                .into_batch()
                .map_err(format_error)?;
            Ok(LoadedFile::Implementors(batch))
        }
    }
}

/// Merge one parsed file into the site.
pub async fn register(site: &SharedSite, loaded: LoadedFile) {
    let mut site = site.write().await;
    match loaded {
        LoadedFile::Shard(shard) => site.shards.insert(shard),
        LoadedFile::Implementors(batch) => site.implementors.register_implementors(batch),
    }
}

/// Load every file under `root` into `site`, at most `concurrency` at a time.
///
/// Files that fail to load are logged and reported in the summary; they never
/// stop the rest of the site from loading.
pub async fn load_site(site: &SharedSite, root: &Path, concurrency: usize) -> Result<LoadSummary> {
    let files = discover(root)
        .await
        .with_context(|| format!("Failed to scan {}", root.display()))?;
    tracing::info!("Loading {} site files from {}", files.len(), root.display());

    let mut summary = LoadSummary::default();
    let mut results = stream::iter(files)
        .map(|file| async move { read_file(&file).await })
        .buffer_unordered(concurrency.max(1));

    while let Some(result) = results.next().await {
        match result {
            Ok(loaded) => {
                match &loaded {
                    LoadedFile::Shard(_) => summary.shards += 1,
                    LoadedFile::Implementors(_) => summary.implementor_files += 1,
                }
                register(site, loaded).await;
            }
            Err(e) => {
                tracing::warn!("{}", e);
                summary.failures.push(e);
            }
        }
    }

    tracing::info!(
        "Loaded {} description shards and {} implementor files ({} failed)",
        summary.shards,
        summary.implementor_files,
        summary.failures.len()
    );
    Ok(summary)
}
