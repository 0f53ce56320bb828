//! Plain-text rendering of registry contents for tool responses.

use crate::implementors::{CrateImplementors, ImplementorRecord};
use regex::Regex;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Drop HTML tags and decode the entities rustdoc emits.
pub fn strip_html(html: &str) -> Cow<'_, str> {
    if !html.contains(['<', '&']) {
        return Cow::Borrowed(html);
    }
    let text = TAG.replace_all(html, "");
    Cow::Owned(
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&"),
    )
}

/// One implementor line, e.g. `impl<T> Deref for Json<T>`.
pub fn implementor_line(record: &ImplementorRecord) -> String {
    let mut line = strip_html(&record.html).into_owned();
    if let Some(type_name) = &record.type_name {
        let _ = write!(line, "  [{}]", type_name);
    }
    if record.synthetic {
        line.push_str("  (auto)");
    }
    line
}

/// Listing of a trait's implementors grouped by crate.
pub fn implementor_listing(trait_path: &str, crates: &CrateImplementors) -> String {
    let total: usize = crates.values().map(Vec::len).sum();
    let mut out = format!(
        "# Implementors of `{}`\n\n{} implementations across {} crates\n",
        trait_path,
        total,
        crates.len()
    );

    for (crate_name, records) in crates {
        let _ = write!(out, "\n## {} ({})\n", crate_name, records.len());
        if records.is_empty() {
            out.push_str("(none)\n");
        }
        for record in records {
            let _ = writeln!(out, "• {}", implementor_line(record));
        }
    }
    out
}

/// Numbered description lines starting at `offset`.
pub fn description_listing<'a>(
    crate_name: &str,
    offset: usize,
    descriptions: impl Iterator<Item = &'a str>,
) -> String {
    let mut out = format!("# Descriptions for `{}`\n\n", crate_name);
    let mut any = false;
    for (index, description) in descriptions.enumerate() {
        any = true;
        let text = strip_html(description);
        let text = if text.is_empty() { "(empty)".into() } else { text };
        let _ = writeln!(out, "{:>6}  {}", offset + index, text);
    }
    if !any {
        out.push_str("(no descriptions in range)\n");
    }
    out
}
