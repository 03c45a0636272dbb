use indexmap::IndexMap;

use crate::model::glicko::Rating;

/// Cross-tournament rating state: player name -> most recent rating.
///
/// An explicit accumulator threaded through the chronological driver
/// loop; callers own its lifetime and can snapshot it for inspection.
/// Entries are never removed, and iteration follows insertion order so
/// downstream output is deterministic.
#[derive(Debug, Clone, Default)]
pub struct HistoryTracker {
    ratings: IndexMap<String, Rating>
}

impl HistoryTracker {
    pub fn new() -> HistoryTracker {
        HistoryTracker {
            ratings: IndexMap::new()
        }
    }

    /// Returns the rating carried over from the player's most recent
    /// prior tournament, if any.
    pub fn get_rating(&self, player: &str) -> Option<&Rating> {
        self.ratings.get(player)
    }

    /// Records a player's post-tournament rating, fully superseding any
    /// carried-in value.
    pub fn insert_or_update(&mut self, player: &str, rating: Rating) {
        self.ratings.insert(player.to_string(), rating);
    }

    pub fn contains(&self, player: &str) -> bool {
        self.ratings.contains_key(player)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Rating)> {
        self.ratings.iter()
    }
}
