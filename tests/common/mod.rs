//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! Every test that touches the filesystem gets its own temporary doc root, so
//! loads never observe files written by another test. Fixture files under
//! `tests/fixtures/site/` are real rustdoc output (`search.desc/` shards and a
//! `trait.impl/` implementor file) and are copied in on demand.
//!
//! # Available Fixtures
//!
//! - `fixture_site`: a temp doc root holding every fixture file
//! - `empty_site`: an empty temp doc root for hand-written files

use rstest::fixture;
use rustdoc_registry::{DocSite, SharedSite};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Returns the project root directory (where Cargo.toml lives).
pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Directory holding the checked-in rustdoc fixture site.
pub fn fixtures_root() -> PathBuf {
    project_root().join("tests/fixtures/site")
}

/// Read a fixture file relative to [`fixtures_root`].
#[allow(dead_code)] // Used by some integration test crates only
pub fn read_fixture(relative: &str) -> String {
    std::fs::read_to_string(fixtures_root().join(relative))
        .unwrap_or_else(|e| panic!("Failed to read fixture '{}': {}", relative, e))
}

/// A temporary doc root for test isolation.
///
/// Provides basic filesystem operations within a temp directory that is
/// automatically cleaned up when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempSite {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempSite {
    /// Creates a new empty temporary doc root.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this doc root.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file with the given content within this doc root.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }

    /// Copies one fixture file into the same relative location.
    ///
    /// # Panics
    /// Panics if copying fails.
    pub fn copy_fixture(&self, relative: &str) {
        self.create_file(relative, &read_fixture(relative));
    }

    /// Copies every fixture file.
    pub fn copy_all_fixtures(&self) {
        for relative in FIXTURE_FILES {
            self.copy_fixture(relative);
        }
    }
}

/// Every file in the fixture site.
pub const FIXTURE_FILES: &[&str] = &[
    "search.desc/hyper_rustls/hyper_rustls-desc-0-.js",
    "search.desc/ring/ring-desc-0-.js",
    "search.desc/rustls_pki_types/rustls_pki_types-desc-0-.js",
    "trait.impl/core/ops/deref/trait.Deref.js",
];

/// Description counts of the fixture shards (one shard per crate).
#[allow(dead_code)]
pub const FIXTURE_DESCRIPTION_COUNTS: &[(&str, usize)] =
    &[("hyper_rustls", 49), ("ring", 343), ("rustls_pki_types", 143)];

/// A temp doc root populated with all fixture files.
#[fixture]
pub fn fixture_site() -> TempSite {
    let site = TempSite::new();
    site.copy_all_fixtures();
    site
}

/// An empty temp doc root.
#[fixture]
pub fn empty_site() -> TempSite {
    TempSite::new()
}

/// Fresh, empty shared registries.
#[fixture]
pub fn shared_site() -> SharedSite {
    DocSite::shared()
}
