//! Implementor registry behaviour and trait.impl parsing on real rustdoc output.

mod common;

use assert2::{check, let_assert};
use common::read_fixture;
use rustdoc_registry::implementors::{
    ImplementorBatch, ImplementorRecord, ImplementorRegistry, SharedBrowser, TraitImplFile,
};
use rustdoc_registry::types::TraitPath;
use std::sync::{Arc, Mutex};

const DEREF: &str = "core::ops::deref::Deref";

fn deref_file() -> TraitImplFile {
    TraitImplFile::new(
        TraitPath::from(DEREF),
        read_fixture("trait.impl/core/ops/deref/trait.Deref.js"),
    )
}

/// A sink that records the crates of every batch it sees, in order.
fn recording_sink() -> (Arc<Mutex<Vec<Vec<String>>>>, impl FnMut(&ImplementorBatch) + Send + Sync) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let sink = move |batch: &ImplementorBatch| {
        let crates: Vec<String> = batch
            .iter()
            .flat_map(|(_, crates)| crates.keys().map(ToString::to_string))
            .collect();
        sink_seen.lock().unwrap().push(crates);
    };
    (seen, sink)
}

#[test]
fn test_batches_before_reader_are_replayed_in_order() {
    let (seen, sink) = recording_sink();
    let mut registry = ImplementorRegistry::new();

    registry.register_implementors(ImplementorBatch::new().with("a::T", "http", vec![]));
    registry.register_implementors(ImplementorBatch::new().with("a::T", "reqwest", vec![]));
    check!(seen.lock().unwrap().is_empty());
    check!(registry.pending_len() == 2);

    check!(registry.attach(Box::new(sink)).is_none());
    check!(*seen.lock().unwrap() == vec![vec!["http".to_string()], vec!["reqwest".to_string()]]);
    check!(registry.pending_len() == 0);

    registry.register_implementors(ImplementorBatch::new().with("a::U", "tokio", vec![]));
    check!(seen.lock().unwrap().len() == 3);
    check!(seen.lock().unwrap()[2] == vec!["tokio".to_string()]);
}

#[test]
fn test_browser_attached_late_holds_both_crates_in_order() {
    let mut registry = ImplementorRegistry::new();
    registry.register_implementors(ImplementorBatch::new().with("a::T", "http", vec![]));
    registry.register_implementors(ImplementorBatch::new().with("a::T", "reqwest", vec![]));

    let browser = SharedBrowser::new();
    registry.attach(Box::new(browser.clone()));

    let browser = browser.read();
    let_assert!(Some(crates) = browser.implementors_of("a::T"));
    let names: Vec<_> = crates.keys().map(|name| name.as_str()).collect();
    check!(names == ["http", "reqwest"]);
    check!(crates.values().all(Vec::is_empty));
    check!(browser.batches_applied() == 2);
}

#[test]
fn test_reader_attached_first_gets_batches_immediately() {
    let (seen, sink) = recording_sink();
    let mut registry = ImplementorRegistry::new();
    registry.attach(Box::new(sink));

    registry.register_implementors(ImplementorBatch::new().with("a::T", "http", vec![]));
    check!(*seen.lock().unwrap() == vec![vec!["http".to_string()]]);
    check!(registry.pending_len() == 0);
}

#[test]
fn test_fixture_deref_file() {
    let file = deref_file();
    let_assert!(Ok(crates) = file.crates());

    check!(crates.len() == 24);
    let names: Vec<_> = crates.keys().map(|name| name.as_str()).collect();
    check!(names[0] == "axum");
    check!(names.contains(&"tokio"));
    check!(crates.values().map(Vec::len).sum::<usize>() == 98);

    let_assert!(Some(axum) = crates.get("axum"));
    check!(axum.len() == 8);
    let types: Vec<_> = axum.iter().filter_map(|r| r.type_name.as_deref()).collect();
    check!(types[0] == "axum::extract::OriginalUri");
    check!(types.contains(&"axum::Extension"));
    check!(types.contains(&"axum::Json"));

    let_assert!(Some(tokio) = crates.get("tokio"));
    check!(tokio.len() == 11);
    check!(tokio.iter().any(|r| r.type_name.as_deref() == Some("tokio::sync::MappedMutexGuard")));
}

#[test]
fn test_fragment_table_matches_full_parse() {
    let file = deref_file();
    let_assert!(Ok(crates) = file.crates());
    let_assert!(Some(table) = file.fragment_table());
    check!(table.fragment_lengths.len() == crates.len());

    for (index, (name, records)) in crates.iter().enumerate() {
        let_assert!(Ok(Some((entry_name, entry_records))) = file.crate_entry(index));
        check!(&entry_name == name);
        check!(&entry_records == records);
    }
    let_assert!(Ok(None) = file.crate_entry(crates.len()));
}

#[test]
fn test_fixture_file_through_registry_and_browser() {
    let mut registry = ImplementorRegistry::new();
    let_assert!(Ok(batch) = deref_file().into_batch());
    registry.register_implementors(batch);
    check!(registry.implementors().implementor_count() == 98);

    let browser = SharedBrowser::new();
    registry.attach(Box::new(browser.clone()));

    let browser = browser.read();
    let_assert!(Ok(trait_path) = browser.resolve_trait("Deref"));
    check!(trait_path.as_str() == DEREF);
    let_assert!(Some(crates) = browser.implementors_of(DEREF));
    check!(crates.len() == 24);
}

#[test]
fn test_reregistering_a_crate_replaces_only_that_crate() {
    let mut registry = ImplementorRegistry::new();
    let_assert!(Ok(batch) = deref_file().into_batch());
    registry.register_implementors(batch);

    registry.register_implementors(ImplementorBatch::new().with(
        DEREF,
        "axum",
        vec![ImplementorRecord::new("impl Deref for Only")],
    ));

    let_assert!(Some(crates) = registry.implementors().get(DEREF));
    check!(crates.len() == 24);
    check!(crates.get_index(0).map(|(name, _)| name.as_str()) == Some("axum"));
    check!(crates.get("axum").map(Vec::len) == Some(1));
    check!(crates.get("tokio").map(Vec::len) == Some(11));
}
