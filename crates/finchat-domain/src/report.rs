//! Report identifiers and identifier resolution

use std::fmt;

/// Suffix appended to every normalized identifier unless configured otherwise
pub const DEFAULT_DOCUMENT_SUFFIX: &str = ".pdf";

/// Normalized lookup key for one report
///
/// Built from free text such as `"Equinor 2020"`: trimmed, lowercased, each
/// whitespace run replaced by a single hyphen, and a document suffix appended
/// (`"equinor-2020.pdf"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportIdentifier(String);

impl ReportIdentifier {
    /// Normalize one free-text entry
    ///
    /// Returns `None` when the entry is blank.
    pub fn from_input(raw: &str, suffix: &str) -> Option<Self> {
        let words: Vec<String> = raw.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            return None;
        }

        let mut key = words.join("-");
        key.push_str(&suffix.to_lowercase());
        Some(Self(key))
    }

    /// Get the identifier as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a store-provided name contains this identifier (case-insensitive)
    pub fn matches(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.0)
    }
}

impl fmt::Display for ReportIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a comma-separated identifier list and normalize each entry
///
/// Blank segments are discarded. Output order follows input order.
///
/// # Examples
///
/// ```
/// use finchat_domain::normalize_identifiers;
///
/// let ids = normalize_identifiers("Equinor 2020, ,Equinor  2021", ".pdf");
/// let keys: Vec<_> = ids.iter().map(|id| id.as_str()).collect();
/// assert_eq!(keys, vec!["equinor-2020.pdf", "equinor-2021.pdf"]);
/// ```
pub fn normalize_identifiers(raw_list: &str, suffix: &str) -> Vec<ReportIdentifier> {
    raw_list
        .split(',')
        .filter_map(|entry| ReportIdentifier::from_input(entry, suffix))
        .collect()
}

/// Resolve identifiers against the names a document store offers
///
/// Each identifier resolves to the first name containing it. Identifiers with
/// no match are dropped; the result keeps the identifiers' order.
pub fn resolve(identifiers: &[ReportIdentifier], names: &[String]) -> Vec<String> {
    identifiers
        .iter()
        .filter_map(|id| names.iter().find(|name| id.matches(name)).cloned())
        .collect()
}
