//! Implementor listings read from the type browser.

use crate::format::implementor_listing;
use crate::implementors::{CrateImplementors, TypeBrowser};
use crate::types::CrateName;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

/// Parameters for list_implementors tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListImplementorsRequest {
    /// Trait path or bare name (e.g. `core::ops::deref::Deref` or `Deref`)
    pub trait_path: String,
    /// Only show implementors documented by this crate
    #[serde(default)]
    pub crate_name: Option<String>,
}

pub fn handle_list_implementors(
    browser: &TypeBrowser,
    request: &ListImplementorsRequest,
) -> Result<String, String> {
    let trait_path = match browser.resolve_trait(&request.trait_path) {
        Ok(path) => path,
        Err(suggestions) => {
            let mut out = format!("Trait '{}' has no registered implementors.", request.trait_path);
            if suggestions.is_empty() {
                if browser.implementors().is_empty() {
                    out.push_str(" No implementor files have been loaded yet.");
                }
            } else {
                out.push_str(" Did you mean one of these?\n\n");
                for suggestion in suggestions.iter().take(5) {
                    let _ = writeln!(out, "• `{}`", suggestion.path);
                }
            }
            return Ok(out);
        }
    };

    let Some(crates) = browser.implementors_of(trait_path.as_str()) else {
        return Err(format!("Trait '{}' disappeared from the browser", trait_path));
    };

    match &request.crate_name {
        Some(name) => {
            let name = CrateName::parse(name).map_err(|e| e.to_string())?;
            let filtered: CrateImplementors = crates
                .iter()
                .filter(|(crate_name, _)| **crate_name == name)
                .map(|(crate_name, records)| (crate_name.clone(), records.clone()))
                .collect();
            if filtered.is_empty() {
                return Ok(format!(
                    "No implementors of `{}` documented by '{}'.",
                    trait_path, name
                ));
            }
            Ok(implementor_listing(trait_path.as_str(), &filtered))
        }
        None => Ok(implementor_listing(trait_path.as_str(), crates)),
    }
}

/// Every trait with registered implementors and its totals.
pub fn handle_list_traits(browser: &TypeBrowser) -> String {
    let set = browser.implementors();
    if set.is_empty() {
        return "No trait implementors registered yet.".to_string();
    }

    let mut out = format!("Traits with implementors ({}):\n", set.len());
    for (trait_path, crates) in set.iter() {
        let total: usize = crates.values().map(Vec::len).sum();
        let _ = writeln!(
            out,
            "  • {} ({} implementations, {} crates)",
            trait_path,
            total,
            crates.len()
        );
    }
    out
}
