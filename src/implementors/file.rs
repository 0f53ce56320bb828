//! `trait.impl/<path>/trait.<Name>.js` files.
//!
//! rustdoc writes one file per trait:
//!
//! ```text
//! (function() {
//!     var implementors = Object.fromEntries([["axum",[["impl … for …"]]],["bytes",[…]]]);
//!     if (window.register_implementors) { … } else { … }
//! })()
//! //{"start":57,"fragment_lengths":[2244,521,…]}
//! ```
//!
//! The trailer locates each crate's entry inside the file: entries start at
//! `start` and follow each other with the listed lengths (UTF-16 code units,
//! every entry after the first carries its leading comma). That lets one
//! crate's entry be read without parsing the whole array.

use super::{CrateImplementors, ImplementorBatch, ImplementorRecord};
use crate::error::FileFormatError;
use crate::types::{CrateName, TraitPath};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Range;
use std::path::{Component, Path};

/// Directory under the doc root holding all trait implementor files.
pub const TRAIT_IMPL_DIR: &str = "trait.impl";

const ENTRIES_CALL: &str = "Object.fromEntries(";

/// Derive the trait path from a file path relative to [`TRAIT_IMPL_DIR`].
///
/// `core/ops/deref/trait.Deref.js` becomes `core::ops::deref::Deref`.
pub fn trait_path_from_relative(relative: &Path) -> Result<TraitPath, FileFormatError> {
    let invalid = || FileFormatError::TraitImplPath(relative.to_path_buf());

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str().ok_or_else(invalid)?),
            _ => return Err(invalid()),
        }
    }

    let file_name = segments.pop().ok_or_else(invalid)?;
    let name = file_name
        .strip_prefix("trait.")
        .and_then(|rest| rest.strip_suffix(".js"))
        .ok_or_else(invalid)?;
    if segments.is_empty() {
        return Err(invalid());
    }
    segments.push(name);

    TraitPath::parse(&segments.join("::")).map_err(|_| invalid())
}

/// Per-crate entry layout recorded in the file trailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentTable {
    pub start: usize,
    pub fragment_lengths: Vec<usize>,
}

impl FragmentTable {
    /// Read the `//{...}` trailer, if the file has one.
    pub fn from_trailer(content: &str) -> Option<Self> {
        let last_line = content.trim_end().lines().next_back()?;
        let json = last_line.trim_start().strip_prefix("//")?;
        serde_json::from_str(json).ok()
    }

    /// Byte ranges of each entry in `content`.
    pub fn byte_ranges(&self, content: &str) -> Result<Vec<Range<usize>>, FileFormatError> {
        let out_of_range = |expected| FileFormatError::FragmentTableOutOfRange {
            expected,
            actual: content.encode_utf16().count(),
        };

        let mut boundaries = Vec::with_capacity(self.fragment_lengths.len() + 1);
        let mut cursor = self.start;
        boundaries.push(cursor);
        for &length in &self.fragment_lengths {
            cursor = cursor
                .checked_add(length)
                .ok_or_else(|| out_of_range(usize::MAX))?;
            boundaries.push(cursor);
        }

        let bytes = utf16_to_byte_offsets(content, &boundaries).ok_or_else(|| out_of_range(cursor))?;
        Ok(bytes.windows(2).map(|pair| pair[0]..pair[1]).collect())
    }
}

/// Convert ascending UTF-16 offsets into byte offsets of `text`.
fn utf16_to_byte_offsets(text: &str, offsets: &[usize]) -> Option<Vec<usize>> {
    let mut result = Vec::with_capacity(offsets.len());
    let mut wanted = offsets.iter().copied().peekable();
    let mut units = 0;

    for (byte, ch) in text.char_indices() {
        while let Some(&offset) = wanted.peek() {
            if offset > units {
                break;
            }
            if offset < units {
                // Falls inside a surrogate pair.
                return None;
            }
            result.push(byte);
            wanted.next();
        }
        units += ch.len_utf16();
    }
    for offset in wanted {
        if offset != units {
            return None;
        }
        result.push(text.len());
    }

    Some(result)
}

/// A loaded trait implementor file.
#[derive(Debug, Clone)]
pub struct TraitImplFile {
    trait_path: TraitPath,
    content: String,
    table: Option<FragmentTable>,
}

impl TraitImplFile {
    pub fn new(trait_path: TraitPath, content: impl Into<String>) -> Self {
        let content = content.into();
        let table = FragmentTable::from_trailer(&content);
        Self {
            trait_path,
            content,
            table,
        }
    }

    pub fn trait_path(&self) -> &TraitPath {
        &self.trait_path
    }

    pub fn fragment_table(&self) -> Option<&FragmentTable> {
        self.table.as_ref()
    }

    /// Parse the whole crate map.
    pub fn crates(&self) -> Result<CrateImplementors, FileFormatError> {
        let open = self
            .content
            .find(ENTRIES_CALL)
            .ok_or(FileFormatError::MissingCall("Object.fromEntries"))?
            + ENTRIES_CALL.len();

        // Only the first JSON value matters; the rest of the file is script.
        let entries = serde_json::Deserializer::from_str(&self.content[open..])
            .into_iter::<Value>()
            .next()
            .ok_or(FileFormatError::MissingCall("Object.fromEntries"))??;

        let Value::Array(entries) = entries else {
            return Err(FileFormatError::MalformedEntry(
                "entries are not an array".to_string(),
            ));
        };

        entries.iter().map(parse_crate_entry).collect()
    }

    /// Raw per-crate entries, sliced with the trailer's fragment table.
    pub fn crate_fragments(&self) -> Result<Vec<&str>, FileFormatError> {
        let table = self
            .table
            .as_ref()
            .ok_or(FileFormatError::MissingCall("fragment table trailer"))?;
        Ok(table
            .byte_ranges(&self.content)?
            .into_iter()
            .map(|range| self.content[range].trim_start_matches(','))
            .collect())
    }

    /// Parse only the `index`-th crate entry.
    pub fn crate_entry(
        &self,
        index: usize,
    ) -> Result<Option<(CrateName, Vec<ImplementorRecord>)>, FileFormatError> {
        let fragments = self.crate_fragments()?;
        let Some(fragment) = fragments.get(index) else {
            return Ok(None);
        };
        let entry: Value = serde_json::from_str(fragment)?;
        parse_crate_entry(&entry).map(Some)
    }

    /// Turn the file into a registration batch for its trait.
    pub fn into_batch(self) -> Result<ImplementorBatch, FileFormatError> {
        let crates = self.crates()?;
        Ok(ImplementorBatch::for_trait(self.trait_path, crates))
    }
}

/// `["crate", [["<html>", synthetic?, …], …]]`
fn parse_crate_entry(entry: &Value) -> Result<(CrateName, Vec<ImplementorRecord>), FileFormatError> {
    let malformed = || FileFormatError::MalformedEntry(truncate(&entry.to_string(), 80));

    let [name, records] = entry.as_array().map(Vec::as_slice).ok_or_else(malformed)? else {
        return Err(malformed());
    };
    let crate_name = CrateName::parse(name.as_str().ok_or_else(malformed)?)?;
    let records = records
        .as_array()
        .ok_or_else(malformed)?
        .iter()
        .map(parse_record)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(malformed)?;

    Ok((crate_name, records))
}

fn parse_record(record: &Value) -> Option<ImplementorRecord> {
    let fields = record.as_array()?;
    let html = fields.first()?.as_str()?;
    let synthetic = fields
        .get(1)
        .is_some_and(|flag| flag.as_bool().unwrap_or_else(|| flag.as_u64() == Some(1)));
    Some(ImplementorRecord::new(html).synthetic(synthetic))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => format!("{}…", &text[..byte]),
        None => text.to_string(),
    }
}

/// Render a trait implementor file with its fragment table trailer
/// (the producer side of [`TraitImplFile`]).
pub fn render_trait_impl_file(crates: &CrateImplementors) -> Result<String, FileFormatError> {
    const PREFIX: &str = "(function() {\n    var implementors = Object.fromEntries([";
    const SUFFIX: &str = "]);\n    if (window.register_implementors) {\n        window.register_implementors(implementors);\n    } else {\n        window.pending_implementors = implementors;\n    }\n})()";

    let mut body = String::new();
    let mut fragment_lengths = Vec::with_capacity(crates.len());
    for (position, (crate_name, records)) in crates.iter().enumerate() {
        let records: Vec<Value> = records
            .iter()
            .map(|record| {
                let mut fields = vec![Value::from(record.html.as_str())];
                if record.synthetic {
                    fields.push(Value::from(1));
                }
                Value::Array(fields)
            })
            .collect();
        let mut fragment = String::new();
        if position > 0 {
            fragment.push(',');
        }
        fragment.push_str(&serde_json::to_string(&(crate_name.as_str(), records))?);
        fragment_lengths.push(fragment.encode_utf16().count());
        body.push_str(&fragment);
    }

    let table = FragmentTable {
        start: PREFIX.encode_utf16().count(),
        fragment_lengths,
    };
    Ok(format!(
        "{PREFIX}{body}{SUFFIX}\n//{}",
        serde_json::to_string(&table)?
    ))
}
