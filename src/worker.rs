//! Background site loading.
//!
//! The server starts answering before the doc site has finished loading, so
//! registration runs in its own task. Implementor batches that land before the
//! browser attaches are queued by the registry and replayed on attach.

use crate::site::{SharedSite, load_site};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Loads a doc root into shared state in the background.
#[derive(Debug)]
pub struct SiteLoader {
    site: SharedSite,
    root: PathBuf,
    concurrency: usize,
}

impl SiteLoader {
    pub fn new(site: SharedSite, root: PathBuf, concurrency: usize) -> Self {
        Self {
            site,
            root,
            concurrency,
        }
    }

    /// Load the site once, stopping early if `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::info!("Site loading for {} cancelled", self.root.display());
            }
            result = load_site(&self.site, &self.root, self.concurrency) => {
                match result {
                    Ok(summary) if summary.failures.is_empty() => {
                        tracing::debug!("Background load of {} finished", self.root.display());
                    }
                    Ok(summary) => {
                        tracing::warn!(
                            "Background load of {} finished with {} failed files",
                            self.root.display(),
                            summary.failures.len()
                        );
                    }
                    Err(e) => {
                        tracing::error!("Background load of {} failed: {:#}", self.root.display(), e);
                    }
                }
            }
        }
    }
}

/// Spawn the site loader as a tokio task.
///
/// Returns a handle to the spawned task.
pub fn spawn_site_loader(
    site: SharedSite,
    root: PathBuf,
    concurrency: usize,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        SiteLoader::new(site, root, concurrency).run(cancel).await;
    })
}
