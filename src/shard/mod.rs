//! Sharded, lazily decoded search description index.

mod descriptor;
pub mod file;
mod store;

pub use descriptor::DescriptorShard;
pub use file::{ShardFileName, parse_shard_file, render_shard_file};
pub use store::ShardStore;
