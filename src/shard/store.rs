//! Process-wide description shard registry.

use super::DescriptorShard;
use crate::types::CrateName;
use ahash::AHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

type CrateShards = BTreeMap<u32, Arc<DescriptorShard>>;

/// Description shards for every crate, keyed by `(crate, shard_index)`.
///
/// Shards may be registered in any order. Lookups only ever see the contiguous
/// run of shards starting at index 0, so the answer for a global item index
/// never changes once it is first available, whatever order the rest arrive in.
#[derive(Debug, Default)]
pub struct ShardStore {
    crates: AHashMap<CrateName, CrateShards>,
}

impl ShardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one shard. Never decodes and never fails.
    ///
    /// A repeated `(crate_name, shard_index)` is a producer bug; the later
    /// shard wins.
    pub fn load_descriptor_shard(
        &mut self,
        crate_name: impl Into<CrateName>,
        shard_index: u32,
        payload: impl Into<String>,
        fragment_lengths: Vec<usize>,
        start_offset: usize,
    ) {
        self.insert(DescriptorShard::new(
            crate_name,
            shard_index,
            payload,
            fragment_lengths,
            start_offset,
        ));
    }

    /// Register an already built shard.
    pub fn insert(&mut self, shard: DescriptorShard) {
        let crate_name = shard.crate_name().clone();
        let shard_index = shard.shard_index();
        let shards = self.crates.entry(crate_name.clone()).or_default();
        if shards.insert(shard_index, Arc::new(shard)).is_some() {
            tracing::warn!(
                "Duplicate description shard {}#{}, replacing earlier one",
                crate_name,
                shard_index
            );
        }
    }

    /// Description of item `global_index` of `crate_name`.
    ///
    /// `None` when the crate is unknown, the index lies beyond the loaded
    /// shards, a shard before it has not arrived yet, or the shard's length
    /// table is inconsistent with its payload.
    pub fn get_description(&self, crate_name: &str, global_index: usize) -> Option<&str> {
        let mut remaining = global_index;
        for shard in contiguous(self.crates.get(crate_name)) {
            if remaining < shard.len() {
                return shard.fragment(remaining);
            }
            remaining -= shard.len();
        }
        None
    }

    /// Every reachable description of `crate_name`, in global index order.
    ///
    /// Lazy and restartable: each call walks the stored shards afresh.
    pub fn descriptions<'a>(&'a self, crate_name: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        contiguous(self.crates.get(crate_name)).flat_map(DescriptorShard::fragments)
    }

    /// Number of descriptions reachable through [`Self::get_description`].
    pub fn description_count(&self, crate_name: &str) -> usize {
        contiguous(self.crates.get(crate_name))
            .map(DescriptorShard::len)
            .sum()
    }

    /// Number of shards registered for `crate_name`, including ones past a gap.
    pub fn shard_count(&self, crate_name: &str) -> usize {
        self.crates.get(crate_name).map_or(0, BTreeMap::len)
    }

    /// Shard indices registered for `crate_name`, ascending.
    pub fn shard_indices(&self, crate_name: &str) -> Vec<u32> {
        self.crates
            .get(crate_name)
            .map(|shards| shards.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Crates with at least one shard, sorted by name.
    pub fn crates(&self) -> Vec<&CrateName> {
        let mut names: Vec<_> = self.crates.keys().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.crates.is_empty()
    }
}

/// Shards `0, 1, 2, ...` up to the first missing index.
fn contiguous(shards: Option<&CrateShards>) -> impl Iterator<Item = &DescriptorShard> {
    shards
        .into_iter()
        .flat_map(|shards| shards.iter())
        .enumerate()
        .take_while(|(position, (index, _))| usize::try_from(**index).is_ok_and(|i| i == *position))
        .map(|(_, (_, shard))| Arc::as_ref(shard))
}
