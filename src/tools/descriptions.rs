//! Description lookups against the shard store.

use crate::format::{description_listing, strip_html};
use crate::shard::ShardStore;
use crate::types::CrateName;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

/// Parameters for get_description tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDescriptionRequest {
    /// Crate whose search index to read (e.g. `ring`)
    pub crate_name: String,
    /// Global item index within the crate's search index
    pub index: usize,
}

/// Parameters for list_descriptions tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListDescriptionsRequest {
    /// Crate whose search index to read
    pub crate_name: String,
    /// First item index to show (default: 0)
    #[serde(default)]
    pub offset: Option<usize>,
    /// Maximum number of descriptions to show (default: 20)
    #[serde(default = "default_limit")]
    pub limit: Option<usize>,
}

fn default_limit() -> Option<usize> {
    Some(20)
}

pub fn handle_get_description(
    shards: &ShardStore,
    request: &GetDescriptionRequest,
) -> Result<String, String> {
    let crate_name = CrateName::parse(&request.crate_name).map_err(|e| e.to_string())?;
    ensure_known(shards, &crate_name)?;

    match shards.get_description(crate_name.as_str(), request.index) {
        Some(description) => Ok(strip_html(description).into_owned()),
        None => Err(format!(
            "No description at index {} for '{}' ({} loaded).",
            request.index,
            crate_name,
            shards.description_count(crate_name.as_str())
        )),
    }
}

pub fn handle_list_descriptions(
    shards: &ShardStore,
    request: &ListDescriptionsRequest,
) -> Result<String, String> {
    let crate_name = CrateName::parse(&request.crate_name).map_err(|e| e.to_string())?;
    ensure_known(shards, &crate_name)?;

    let offset = request.offset.unwrap_or(0);
    let limit = request.limit.unwrap_or(20);
    let descriptions = shards
        .descriptions(crate_name.as_str())
        .skip(offset)
        .take(limit);

    let mut out = description_listing(crate_name.as_str(), offset, descriptions);
    let total = shards.description_count(crate_name.as_str());
    let _ = write!(out, "\n{} descriptions loaded", total);
    let shard_count = shards.shard_count(crate_name.as_str());
    let indices = shards.shard_indices(crate_name.as_str());
    if indices.iter().enumerate().any(|(position, &index)| index as usize != position) {
        let _ = write!(
            out,
            " (shards {:?} of {} registered; later shards wait for the gap to fill)",
            indices, shard_count
        );
    }
    out.push('\n');
    Ok(out)
}

fn ensure_known(shards: &ShardStore, crate_name: &CrateName) -> Result<(), String> {
    if shards.shard_count(crate_name.as_str()) > 0 {
        return Ok(());
    }
    let known: Vec<_> = shards.crates().into_iter().map(CrateName::as_str).collect();
    if known.is_empty() {
        Err("No description shards loaded. Use load_site first.".to_string())
    } else {
        Err(format!(
            "No description shards for '{}'. Loaded crates: {}",
            crate_name,
            known.join(", ")
        ))
    }
}
