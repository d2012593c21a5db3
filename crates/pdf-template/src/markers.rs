//! Placeholder markers and their replacement values
//!
//! A marker is written `{name}` inside page text: an opening brace, one or
//! more characters other than `}`, and a closing brace. There is no escaping
//! and no nesting.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}]+)\}").unwrap());

/// Marker names found in `text`, left to right, duplicates included
pub fn find_markers(text: &str) -> impl Iterator<Item = &str> {
    MARKER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Ordered set of marker names, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl Markers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name; returns false if it was already present
    pub fn insert(&mut self, name: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string());
        self.names.push(name.to_string());
        true
    }

    /// Add every marker found in `text`
    pub fn scan(&mut self, text: &str) {
        for name in find_markers(text) {
            self.insert(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

impl<'a> IntoIterator for &'a Markers {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Markers {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut markers = Markers::new();
        for name in iter {
            markers.insert(name.as_ref());
        }
        markers
    }
}

/// Marker name → replacement string.
///
/// Lookups of names that were never set yield the empty string, so an
/// unset marker deletes its placeholder text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementTable {
    values: HashMap<String, String>,
}

impl ReplacementTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, marker: impl Into<String>, value: impl Into<String>) {
        self.values.insert(marker.into(), value.into());
    }

    pub fn get(&self, marker: &str) -> &str {
        self.values.get(marker).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.values.contains_key(marker)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ReplacementTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = ReplacementTable::new();
        for (marker, value) in iter {
            table.insert(marker, value);
        }
        table
    }
}

/// Replace every literal `{marker}` for each marker in `markers`.
///
/// Placeholders whose name is not in `markers` are left untouched.
pub fn substitute(text: &str, markers: &Markers, table: &ReplacementTable) -> String {
    let mut result = text.to_string();
    for marker in markers.iter() {
        let placeholder = format!("{{{}}}", marker);
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, table.get(marker));
        }
    }
    result
}
