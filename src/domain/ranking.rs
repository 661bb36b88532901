use crate::domain::money::Yen;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PLAYER: &str = "anonymous";

/// Timestamp layout used for ranking rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A finished game's final score. Written once, never updated.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct RankingEntry {
    pub player: String,
    pub score: Yen,
    pub timestamp: String,
}

impl RankingEntry {
    /// Stamps `score` with the current local time.
    pub fn now(player: impl Into<String>, score: Yen) -> Self {
        Self {
            player: player.into(),
            score,
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Orders entries best first; equal scores keep their insertion order.
pub fn rank(mut entries: Vec<RankingEntry>, limit: usize) -> Vec<RankingEntry> {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(limit);
    entries
}
