//! Overview of everything registered so far.

use crate::implementors::TypeBrowser;
use crate::site::DocSite;
use std::fmt::Write as _;

pub fn handle_list_crates(site: &DocSite, browser: &TypeBrowser) -> String {
    let crates = site.shards.crates();
    let mut out = String::new();

    if crates.is_empty() {
        out.push_str("No description shards loaded.\n");
    } else {
        let _ = writeln!(out, "Crates with search descriptions ({}):", crates.len());
        for crate_name in crates {
            let _ = writeln!(
                out,
                "  • {} ({} descriptions, {} shards)",
                crate_name,
                site.shards.description_count(crate_name.as_str()),
                site.shards.shard_count(crate_name.as_str())
            );
        }
    }

    let registry = &site.implementors;
    let _ = write!(
        out,
        "\nImplementor registry: {} batches registered, {} traits",
        registry.registered(),
        registry.implementors().len()
    );
    if registry.is_attached() {
        let _ = writeln!(out, ", browser shows {} traits", browser.implementors().len());
    } else {
        let _ = writeln!(out, ", {} batches waiting for the browser", registry.pending_len());
    }

    out
}
