//! The type-relationship browser: the reader side of the implementor registry.

use super::{CrateImplementors, ImplementorBatch, ImplementorSet, ImplementorSink};
use crate::types::TraitPath;
use rapidfuzz::distance::jaro_winkler;
use std::sync::{Arc, RwLock, RwLockReadGuard};

/// Minimum similarity for a trait path to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Live display model of "implementors of trait X" listings.
#[derive(Debug, Default)]
pub struct TypeBrowser {
    set: ImplementorSet,
    batches_applied: usize,
}

/// A trait path that is close to a query which matched nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitSuggestion {
    pub path: TraitPath,
    pub score: f64,
}

impl TypeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn implementors_of(&self, trait_path: &str) -> Option<&CrateImplementors> {
        self.set.get(trait_path)
    }

    pub fn traits(&self) -> impl Iterator<Item = &TraitPath> {
        self.set.traits()
    }

    pub fn implementors(&self) -> &ImplementorSet {
        &self.set
    }

    pub fn batches_applied(&self) -> usize {
        self.batches_applied
    }

    /// Resolve a user query to a known trait.
    ///
    /// Tries the exact path first, then a unique bare-name match (`Deref`).
    /// Otherwise returns the closest known paths, best first.
    pub fn resolve_trait(&self, query: &str) -> Result<&TraitPath, Vec<TraitSuggestion>> {
        let query = query.trim();
        if let Some((path, _)) = self.set.iter().find(|(path, _)| path.as_str() == query) {
            return Ok(path);
        }

        let mut by_name = self.set.traits().filter(|path| path.name() == query);
        if let (Some(path), None) = (by_name.next(), by_name.next()) {
            return Ok(path);
        }

        let mut suggestions: Vec<_> = self
            .set
            .traits()
            .map(|path| TraitSuggestion {
                path: path.clone(),
                score: jaro_winkler::similarity(query.chars(), path.as_str().chars())
                    .max(jaro_winkler::similarity(query.chars(), path.name().chars())),
            })
            .filter(|suggestion| suggestion.score > SUGGESTION_THRESHOLD)
            .collect();
        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        Err(suggestions)
    }
}

impl ImplementorSink for TypeBrowser {
    fn apply(&mut self, batch: &ImplementorBatch) {
        self.set.apply(batch);
        self.batches_applied += 1;
    }
}

/// A [`TypeBrowser`] shared between the registry (which feeds it) and readers.
#[derive(Debug, Clone, Default)]
pub struct SharedBrowser(Arc<RwLock<TypeBrowser>>);

impl SharedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the browser model.
    pub fn read(&self) -> RwLockReadGuard<'_, TypeBrowser> {
        self.0
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ImplementorSink for SharedBrowser {
    fn apply(&mut self, batch: &ImplementorBatch) {
        self.0
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .apply(batch);
    }
}
