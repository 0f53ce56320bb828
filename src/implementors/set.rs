//! Implementor records, batches and the accumulated trait map.

use crate::types::{CrateName, TraitPath};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

/// Anchor that names the implementing type: the first link after ` for `.
static SELF_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#" for [^<]*<a class="[^"]*" href="[^"]*" title="[a-z]+ ([^"]+)""#)
        .expect("self type pattern is valid")
});

/// One "impl Trait for Type" line as rendered by rustdoc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplementorRecord {
    /// The rendered `impl` header.
    pub html: String,
    /// Qualified path of the implementing type, when the header links to one.
    pub type_name: Option<String>,
    /// Blanket or auto-trait implementation generated by the compiler.
    pub synthetic: bool,
}

impl ImplementorRecord {
    pub fn new(html: impl Into<String>) -> Self {
        let html = html.into();
        let type_name = SELF_TYPE
            .captures(&html)
            .map(|captures| captures[1].to_string());
        Self {
            html,
            type_name,
            synthetic: false,
        }
    }

    pub fn synthetic(mut self, synthetic: bool) -> Self {
        self.synthetic = synthetic;
        self
    }
}

/// Implementors of one trait, grouped by the crate that documents them.
pub type CrateImplementors = IndexMap<CrateName, Vec<ImplementorRecord>>;

/// One registration call's worth of data: trait → crate → implementors.
///
/// Insertion order is preserved for both levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImplementorBatch {
    traits: IndexMap<TraitPath, CrateImplementors>,
}

impl ImplementorBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A batch carrying one trait's crate map.
    pub fn for_trait(trait_path: impl Into<TraitPath>, crates: CrateImplementors) -> Self {
        let mut batch = Self::new();
        batch.traits.insert(trait_path.into(), crates);
        batch
    }

    /// Set the implementors `crate_name` documents for `trait_path`.
    pub fn insert(
        &mut self,
        trait_path: impl Into<TraitPath>,
        crate_name: impl Into<CrateName>,
        records: Vec<ImplementorRecord>,
    ) {
        self.traits
            .entry(trait_path.into())
            .or_default()
            .insert(crate_name.into(), records);
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with(
        mut self,
        trait_path: impl Into<TraitPath>,
        crate_name: impl Into<CrateName>,
        records: Vec<ImplementorRecord>,
    ) -> Self {
        self.insert(trait_path, crate_name, records);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TraitPath, &CrateImplementors)> {
        self.traits.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// Number of traits in the batch.
    pub fn len(&self) -> usize {
        self.traits.len()
    }
}

impl From<IndexMap<TraitPath, CrateImplementors>> for ImplementorBatch {
    fn from(traits: IndexMap<TraitPath, CrateImplementors>) -> Self {
        Self { traits }
    }
}

/// Accumulated implementors of every registered trait.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImplementorSet {
    traits: IndexMap<TraitPath, CrateImplementors>,
}

impl ImplementorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch.
    ///
    /// Each `(trait, crate)` list in the batch replaces the stored list for that
    /// pair; crates the batch does not mention are left alone. New traits and
    /// crates are appended, existing ones keep their position.
    pub fn apply(&mut self, batch: &ImplementorBatch) {
        for (trait_path, crates) in batch.iter() {
            let stored = self.traits.entry(trait_path.clone()).or_default();
            for (crate_name, records) in crates {
                stored.insert(crate_name.clone(), records.clone());
            }
        }
    }

    pub fn get(&self, trait_path: &str) -> Option<&CrateImplementors> {
        self.traits.get(trait_path)
    }

    pub fn traits(&self) -> impl Iterator<Item = &TraitPath> {
        self.traits.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TraitPath, &CrateImplementors)> {
        self.traits.iter()
    }

    /// Number of traits.
    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// Total implementor records across all traits and crates.
    pub fn implementor_count(&self) -> usize {
        self.traits
            .values()
            .flat_map(IndexMap::values)
            .map(Vec::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    const DEREF: &str = "core::ops::deref::Deref";

    fn record(type_name: &str) -> ImplementorRecord {
        ImplementorRecord::new(format!(
            r#"impl <a class="trait" href="deref/trait.Deref.html" title="trait core::ops::deref::Deref">Deref</a> for <a class="struct" href="x.html" title="struct {type_name}">X</a>"#
        ))
    }

    #[test]
    fn test_record_extracts_self_type() {
        let record = ImplementorRecord::new(
            r#"impl&lt;T&gt; <a class="trait" href="https://doc.rust-lang.org/nightly/core/ops/deref/trait.Deref.html" title="trait core::ops::deref::Deref">Deref</a> for <a class="struct" href="axum/struct.Json.html" title="struct axum::Json">Json</a>&lt;T&gt;"#,
        );
        check!(record.type_name.as_deref() == Some("axum::Json"));
        check!(!record.synthetic);
    }

    #[test]
    fn test_record_without_link() {
        let record = ImplementorRecord::new("impl Deref for Local");
        check!(record.type_name.is_none());
    }

    #[test]
    fn test_apply_replaces_per_crate() {
        let mut set = ImplementorSet::new();
        set.apply(
            &ImplementorBatch::new()
                .with(DEREF, "bytes", vec![record("bytes::Bytes")])
                .with(DEREF, "axum", vec![record("axum::Json")]),
        );
        set.apply(&ImplementorBatch::new().with(
            DEREF,
            "bytes",
            vec![record("bytes::BytesMut")],
        ));

        let crates = set.get(DEREF).expect("trait registered");
        let names: Vec<_> = crates.keys().map(CrateName::as_str).collect();
        check!(names == ["bytes", "axum"]);
        check!(crates["bytes"].len() == 1);
        check!(crates["bytes"][0].type_name.as_deref() == Some("bytes::BytesMut"));
        check!(set.implementor_count() == 2);
    }

    #[test]
    fn test_apply_unknown_trait_is_new_entry() {
        let mut set = ImplementorSet::new();
        set.apply(&ImplementorBatch::new().with("not::a::Known", "x", vec![]));
        check!(set.len() == 1);
        check!(set.get("not::a::Known").is_some_and(|crates| crates["x"].is_empty()));
    }
}
