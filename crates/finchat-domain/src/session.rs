//! Per-run cache of extracted report text

use std::collections::HashMap;

/// Full extracted plain text of one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportText(String);

impl ReportText {
    /// Wrap extracted text
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Get the text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether extraction produced no text at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reports fetched during the current session, in first-fetch order
///
/// Entries are only ever added; a report stays cached for the lifetime of the
/// session even if the underlying document changes.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    texts: HashMap<String, ReportText>,
    order: Vec<String>,
}

impl SessionState {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a report has already been fetched
    pub fn contains(&self, name: &str) -> bool {
        self.texts.contains_key(name)
    }

    /// Record a freshly extracted report
    ///
    /// Returns `false` and leaves the session untouched if the name is
    /// already present.
    pub fn insert(&mut self, name: impl Into<String>, text: ReportText) -> bool {
        let name = name.into();
        if self.texts.contains_key(&name) {
            return false;
        }
        self.order.push(name.clone());
        self.texts.insert(name, text);
        true
    }

    /// Get the text of a cached report
    pub fn get(&self, name: &str) -> Option<&ReportText> {
        self.texts.get(name)
    }

    /// Report names in first-fetch order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Iterate `(name, text)` pairs in first-fetch order
    pub fn reports(&self) -> impl Iterator<Item = (&str, &ReportText)> {
        self.order
            .iter()
            .filter_map(|name| self.texts.get(name).map(|text| (name.as_str(), text)))
    }

    /// Number of cached reports
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing has been fetched yet
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
