//! Loads a rustdoc output directory on request.

use crate::config::expand_tilde;
use crate::site::{LoadSummary, SharedSite, load_site};
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Parameters for load_site tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LoadSiteRequest {
    /// Path to a rustdoc output directory (e.g. `target/doc`)
    pub path: String,
}

/// Resolve the requested directory and load it into the shared site.
///
/// Loading is additive: shards and implementors already registered stay.
pub async fn handle_load_site(
    site: &SharedSite,
    request: LoadSiteRequest,
    concurrency: usize,
) -> Result<String, String> {
    let expanded = PathBuf::from(&*expand_tilde(request.path.trim()));
    let root = tokio::fs::canonicalize(&expanded)
        .await
        .map_err(|e| format!("Failed to resolve path '{}': {}", request.path, e))?;

    let summary = load_site(site, &root, concurrency)
        .await
        .map_err(|e| format!("Failed to load site: {:#}", e))?;

    Ok(format_response(&root, &summary))
}

pub fn format_response(root: &Path, summary: &LoadSummary) -> String {
    let mut out = format!(
        "Loaded {}\n  • {} description shards\n  • {} trait implementor files\n",
        root.display(),
        summary.shards,
        summary.implementor_files
    );

    if summary.shards == 0 && summary.implementor_files == 0 && summary.failures.is_empty() {
        out.push_str(
            "\nNo `search.desc/` or `trait.impl/` files found. \
             Point at the directory rustdoc wrote (usually `target/doc`).\n",
        );
    }

    if !summary.failures.is_empty() {
        let _ = writeln!(out, "\n{} files failed to load:", summary.failures.len());
        for failure in summary.failures.iter().take(10) {
            let _ = writeln!(out, "  • {}", failure);
        }
        if summary.failures.len() > 10 {
            let _ = writeln!(out, "  ... and {} more", summary.failures.len() - 10);
        }
    }

    out
}
