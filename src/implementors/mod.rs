//! Trait implementor registry and its reader.

mod browser;
pub mod file;
mod registry;
mod set;

pub use browser::{SharedBrowser, TraitSuggestion, TypeBrowser};
pub use file::{FragmentTable, TraitImplFile, render_trait_impl_file, trait_path_from_relative};
pub use registry::{ImplementorRegistry, ImplementorSink};
pub use set::{CrateImplementors, ImplementorBatch, ImplementorRecord, ImplementorSet};
