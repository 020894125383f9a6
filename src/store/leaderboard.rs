/// High score table.
///
/// Stored as a JSON array of `{name, score, timestamp}` records, best first.
/// Ranking: higher score first, then the older entry, then the name that
/// sorts later. Only the top `LEADER_BOARD_SIZE` entries are kept.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;
use crate::sim::engine::SCORE_UPPER_BOUND;
use crate::store::Store;

pub const LEADER_BOARD_SIZE: usize = 10;
const ANONYMOUS: &str = "Anonymous";

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl ScoreEntry {
    /// `Less` means `self` ranks above `other`.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then(self.timestamp.cmp(&other.timestamp))
            .then(other.name.cmp(&self.name))
    }

    /// A record from disk, or `None` if a field is missing, mistyped or out of range.
    fn from_json(value: &Value) -> Option<ScoreEntry> {
        let name = value.get("name")?.as_str()?;
        let score = whole_number(value.get("score")?)?;
        let timestamp = whole_number(value.get("timestamp")?)?;
        let score = u32::try_from(score).ok().filter(|&s| s <= SCORE_UPPER_BOUND)?;
        Some(ScoreEntry { name: name.to_owned(), score, timestamp })
    }
}

/// Any JSON number without a fractional part, so `10.0` reads as `10`.
fn whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

fn rank(entries: &mut Vec<ScoreEntry>) {
    entries.sort_by(ScoreEntry::rank_cmp);
    entries.truncate(LEADER_BOARD_SIZE);
}

impl Store {
    /// Ranked entries. Bad records are skipped; a bad file reads as empty.
    pub fn load_scores(&self) -> Vec<ScoreEntry> {
        let path = self.leader_board_path();
        let Some(value) = Self::read_json(&path) else {
            return Vec::new();
        };
        let Some(records) = value.as_array() else {
            tracing::warn!("ignoring {}: not an array", path.display());
            return Vec::new();
        };
        let mut entries: Vec<ScoreEntry> = records.iter().filter_map(ScoreEntry::from_json).collect();
        if entries.len() != records.len() {
            tracing::warn!("skipped {} invalid leaderboard records", records.len() - entries.len());
        }
        entries.sort_by(ScoreEntry::rank_cmp);
        entries
    }

    /// Records a finished game now. An empty name is saved as "Anonymous".
    pub fn save_score(&self, name: &str, score: u32) -> Result<(), StoreError> {
        self.save_score_at(name, score, chrono::Utc::now().timestamp())
    }

    fn save_score_at(&self, name: &str, score: u32, timestamp: i64) -> Result<(), StoreError> {
        let name = if name.is_empty() { ANONYMOUS } else { name };
        let mut entries = self.load_scores();
        entries.push(ScoreEntry { name: name.to_owned(), score: score.min(SCORE_UPPER_BOUND), timestamp });
        rank(&mut entries);
        self.write_json(&self.leader_board_path(), &entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entry(score: u32, name: &str, timestamp: i64) -> ScoreEntry {
        ScoreEntry { name: name.into(), score, timestamp }
    }

    fn store() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (Store::at(dir.path()), dir)
    }

    // ── Ranking ──

    #[test]
    fn ranking_order() {
        let mut entries = vec![entry(5, "B", 100), entry(9, "A", 50), entry(5, "A", 90)];
        rank(&mut entries);
        assert_eq!(entries, vec![entry(9, "A", 50), entry(5, "A", 90), entry(5, "B", 100)]);
    }

    #[test]
    fn ties_on_score_and_time_prefer_later_name() {
        let mut entries = vec![entry(3, "Amy", 10), entry(3, "Zed", 10)];
        rank(&mut entries);
        assert_eq!(entries[0].name, "Zed");
    }

    #[test]
    fn table_is_capped() {
        let (store, _dir) = store();
        for i in 0..15 {
            store.save_score_at("p", i, 1000 + i as i64).unwrap();
        }
        let scores = store.load_scores();
        assert_eq!(scores.len(), LEADER_BOARD_SIZE);
        assert_eq!(scores[0].score, 14);
        assert_eq!(scores[9].score, 5);
    }

    // ── Persistence ──

    #[test]
    fn empty_name_becomes_anonymous() {
        let (store, _dir) = store();
        store.save_score_at("", 12, 1).unwrap();
        assert_eq!(store.load_scores(), vec![entry(12, "Anonymous", 1)]);
    }

    #[test]
    fn missing_file_is_empty() {
        let (store, _dir) = store();
        assert!(store.load_scores().is_empty());
    }

    #[test]
    fn invalid_records_are_skipped() {
        let (store, _dir) = store();
        let records = json!([
            { "name": "ok", "score": 10, "timestamp": 5 },
            { "name": "neg", "score": -1, "timestamp": 5 },
            { "name": "big", "score": 100000, "timestamp": 5 },
            { "name": 3, "score": 10, "timestamp": 5 },
            { "score": 10, "timestamp": 5 },
            { "name": "edge", "score": 99999, "timestamp": 7 },
        ]);
        std::fs::write(store.leader_board_path(), records.to_string()).unwrap();
        assert_eq!(store.load_scores(), vec![entry(99999, "edge", 7), entry(10, "ok", 5)]);
    }

    #[test]
    fn whole_float_numbers_are_accepted() {
        let (store, _dir) = store();
        let records = json!([
            { "name": "float", "score": 10.0, "timestamp": 8.0 },
            { "name": "half", "score": 10.5, "timestamp": 8 },
            { "name": "text", "score": "10", "timestamp": 8 },
        ]);
        std::fs::write(store.leader_board_path(), records.to_string()).unwrap();
        assert_eq!(store.load_scores(), vec![entry(10, "float", 8)]);
    }

    #[test]
    fn non_array_file_is_empty() {
        let (store, _dir) = store();
        std::fs::write(store.leader_board_path(), r#"{"name":"x"}"#).unwrap();
        assert!(store.load_scores().is_empty());
    }

    #[test]
    fn file_uses_four_space_indent() {
        let (store, _dir) = store();
        store.save_score_at("Al", 3, 9).unwrap();
        let text = std::fs::read_to_string(store.leader_board_path()).unwrap();
        assert!(text.contains("\n        \"name\": \"Al\""), "{text}");
    }
}
