//! Old-term to new-term substitution map.

use crate::model::Contradiction;

/// Ordered `source_a_object -> source_b_object` map.
///
/// Keys keep their first-insertion position; a repeated key takes the last
/// value provided. Blank keys are ignored since they would match every
/// paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionMap {
    entries: Vec<(String, String)>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_contradictions(contradictions: &[Contradiction]) -> Self {
        let mut map = Self::new();
        for c in contradictions {
            map.insert(&c.source_a_object, &c.source_b_object);
        }
        map
    }

    pub fn insert(&mut self, old: &str, new: &str) {
        if old.trim().is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| k == old) {
            Some(entry) => entry.1 = new.to_string(),
            None => self.entries.push((old.to_string(), new.to_string())),
        }
    }

    pub fn get(&self, old: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == old)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True if any key occurs in `text`, ignoring case.
    pub fn matches_any(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.entries
            .iter()
            .any(|(k, _)| lowered.contains(&k.to_lowercase()))
    }

    /// Entries whose key occurs in `text`, ignoring case.
    pub fn matching<'a>(&'a self, text: &str) -> Vec<(&'a str, &'a str)> {
        let lowered = text.to_lowercase();
        self.iter()
            .filter(|(k, _)| lowered.contains(&k.to_lowercase()))
            .collect()
    }
}
