//! Ranked name-to-score mappings.
//!
//! The dashboard reads leaderboards as JSON objects and relies on key order
//! for ranking, so a `Leaderboard` is an ordered list of entries rather than
//! a hash map. Serialization writes a JSON object in entry order and
//! deserialization keeps the order the keys appear in the source.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Ordered mapping from entity name to score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for Leaderboard<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> Leaderboard<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a leaderboard keeping the given order as-is.
    pub fn from_entries(entries: Vec<(String, V)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Rank position (0-based) of `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == name)
    }

    pub fn into_entries(self) -> Vec<(String, V)> {
        self.entries
    }
}

impl<V: PartialOrd> Leaderboard<V> {
    /// Rank entries by score, highest first, keeping at most `limit`.
    ///
    /// The sort is stable: equal scores keep the order in which they were
    /// first seen, the same tie-break the producer's `most_common` applies.
    pub fn ranked(mut entries: Vec<(String, V)>, limit: usize) -> Self {
        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        entries.truncate(limit);
        Self { entries }
    }

    /// True when scores never increase along the entry order.
    pub fn is_ranked(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].1 >= w[1].1)
    }
}

impl<V: Copy + std::iter::Sum<V>> Leaderboard<V> {
    pub fn total(&self) -> V {
        self.entries.iter().map(|(_, v)| *v).sum()
    }
}

impl<V: Serialize> Serialize for Leaderboard<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, score) in &self.entries {
            map.serialize_entry(name, score)?;
        }
        map.end()
    }
}

struct LeaderboardVisitor<V> {
    marker: PhantomData<V>,
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for LeaderboardVisitor<V> {
    type Value = Leaderboard<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object mapping names to numeric scores")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
        let mut entries: Vec<(String, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, score)) = access.next_entry::<String, V>()? {
            // Last occurrence wins, same as a JSON object read into a map.
            if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == name) {
                slot.1 = score;
            } else {
                entries.push((name, score));
            }
        }
        Ok(Leaderboard { entries })
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Leaderboard<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LeaderboardVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Amount;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ranked_is_stable_on_ties() {
        let board = Leaderboard::ranked(
            vec![
                ("Alpha".to_string(), 2u64),
                ("Bravo".to_string(), 5),
                ("Charlie".to_string(), 2),
                ("Delta".to_string(), 1),
            ],
            3,
        );

        let names: Vec<&str> = board.names().collect();
        assert_eq!(names, vec!["Bravo", "Alpha", "Charlie"]);
        assert!(board.is_ranked());
    }

    #[test]
    fn test_deserialize_preserves_key_order() {
        let json = r#"{"Zeta Transport": 7, "Al Masa": 4, "Bin Saad": 4}"#;
        let board: Leaderboard<u64> = serde_json::from_str(json).unwrap();

        let names: Vec<&str> = board.names().collect();
        assert_eq!(names, vec!["Zeta Transport", "Al Masa", "Bin Saad"]);
        assert_eq!(board.get("Al Masa"), Some(&4));
        assert_eq!(board.position("Bin Saad"), Some(2));
    }

    #[test]
    fn test_serialize_writes_object_in_entry_order() {
        let board = Leaderboard::from_entries(vec![
            ("b".to_string(), 1u64),
            ("a".to_string(), 2),
        ]);
        assert_eq!(serde_json::to_string(&board).unwrap(), r#"{"b":1,"a":2}"#);
    }

    #[test]
    fn test_amount_board_total() {
        let board: Leaderboard<Amount> =
            serde_json::from_str(r#"{"Crane": 1500.5, "Forklift": 250}"#).unwrap();
        assert_eq!(board.total().inner(), dec!(1750.5));
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(serde_json::from_str::<Leaderboard<u64>>("[1, 2]").is_err());
        assert!(serde_json::from_str::<Leaderboard<u64>>(r#"{"a": -1}"#).is_err());
    }

    #[test]
    fn test_empty_board() {
        let board: Leaderboard<u64> = serde_json::from_str("{}").unwrap();
        assert!(board.is_empty());
        assert_eq!(board.total(), 0);
        assert!(board.is_ranked());
    }
}
