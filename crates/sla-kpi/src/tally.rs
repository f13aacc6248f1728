//! Insertion-ordered per-name accumulation.

use sla_core::Leaderboard;
use std::collections::HashMap;
use std::ops::AddAssign;

/// Per-name accumulator that remembers first-seen order for tie-breaking.
pub(crate) struct Tally<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for Tally<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V: AddAssign + PartialOrd> Tally<V> {
    pub(crate) fn add(&mut self, name: &str, value: V) {
        match self.index.get(name) {
            Some(&i) => self.entries[i].1 += value,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), value));
            }
        }
    }

    pub(crate) fn ranked(self, limit: usize) -> Leaderboard<V> {
        Leaderboard::ranked(self.entries, limit)
    }
}
