use std::collections::BTreeSet;

use crate::catalog::Roster;

/// Hero ids eligible for the next draw.
///
/// Ids are not checked against the roster: `toggle` accepts anything, and an
/// unknown id in the pool can be drawn like any other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeroPool {
    ids: BTreeSet<String>,
}

impl HeroPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_all(&mut self, roster: &Roster) {
        self.ids = roster.ids().map(str::to_string).collect();
    }

    pub fn deselect_all(&mut self) {
        self.ids.clear();
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in ascending order; this is the sequence the hero draw indexes.
    pub fn snapshot(&self) -> Vec<&str> {
        self.ids.iter().map(String::as_str).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for HeroPool {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
