use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifetime totals for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryStats {
    pub games: u32,
    pub correct: u32,
    pub seen: u32,
}

/// Lifetime statistics, persisted across sessions. Everything but
/// `best_accuracy` accumulates monotonically; `best_accuracy` is a
/// running maximum. Wire shape matches the mobile app's camelCase JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub total_games: u32,
    pub total_correct: u32,
    pub total_seen: u32,
    pub best_accuracy: u8,
    pub category_stats: HashMap<String, CategoryStats>,
    pub last_played: Option<DateTime<Local>>,
}

impl Stats {
    /// Fold one finished session into the lifetime totals.
    pub fn record_session(&mut self, category: &str, seen: u32, correct: u32, accuracy: u8) {
        self.total_games += 1;
        self.total_correct += correct;
        self.total_seen += seen;
        self.best_accuracy = self.best_accuracy.max(accuracy);

        let bucket = self.category_stats.entry(category.to_string()).or_default();
        bucket.games += 1;
        bucket.correct += correct;
        bucket.seen += seen;

        self.last_played = Some(Local::now());
    }
}
