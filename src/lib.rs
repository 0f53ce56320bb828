//! Client-side data loading for generated rustdoc sites.
//!
//! Two registries fed incrementally by static files that may arrive in any
//! order: a sharded, lazily decoded search description index
//! ([`shard::ShardStore`]) and a trait implementor registry
//! ([`implementors::ImplementorRegistry`]) that buffers batches until its
//! reader attaches.

pub mod config;
pub mod error;
pub mod format;
pub mod implementors;
pub mod server;
pub mod shard;
pub mod site;
pub mod tools;
pub mod tracing;
pub mod types;
pub mod worker;

pub use config::Config;
pub use implementors::{
    ImplementorBatch, ImplementorRecord, ImplementorRegistry, ImplementorSet, ImplementorSink,
    SharedBrowser, TypeBrowser,
};
pub use server::RegistryServer;
pub use shard::{DescriptorShard, ShardStore};
pub use site::{DocSite, LoadSummary, SharedSite, load_site};
pub use types::{CrateName, TraitPath};
