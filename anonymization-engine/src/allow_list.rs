//! Domain allow-list
//!
//! Medical terminology that must never be flagged as PII. Disease names in
//! particular look like proper nouns ("Parkinson", "Alzheimer") and would
//! otherwise be picked up by name recognizers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Condition names shipped as the default allow-list (German clinical usage)
pub const MEDICAL_CONDITIONS: &[&str] = &[
    "diabetes",
    "hypertonie",
    "asthma",
    "migräne",
    "arthritis",
    "depression",
    "angststörung",
    "herzinsuffizienz",
    "copd",
    "parkinson",
    "alzheimer",
    "multiple sklerose",
    "epilepsie",
];

/// Case-insensitive set of terms that are never PII
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowList {
    terms: BTreeSet<String>,
}

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default medical vocabulary
    pub fn medical() -> Self {
        Self::from_terms(MEDICAL_CONDITIONS.iter().copied())
    }

    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        list.extend(terms);
        list
    }

    pub fn extend<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let normalized = Self::normalize(term.as_ref());
            if !normalized.is_empty() {
                self.terms.insert(normalized);
            }
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.terms.contains(&Self::normalize(text))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn normalize(term: &str) -> String {
        term.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}
