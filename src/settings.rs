use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Mode};

/// Upper bound on the requested card count; above the pool size the
/// presentation order repeats the pool in independent shuffles.
pub const MAX_CARDS: usize = 500;
/// Upper bound on the reveal delay in seconds.
pub const MAX_DELAY_SECS: f64 = 60.0;

/// Persisted practice settings. Serialized with the camelCase keys the
/// mobile app used, so stored records keep round-tripping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub category: String,
    pub delay_sec: f64,
    pub count: usize,
    pub mode: Mode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            category: "days".to_string(),
            delay_sec: 2.0,
            count: 7,
            mode: Mode::NumToWord,
        }
    }
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub category: Option<String>,
    pub delay_sec: Option<f64>,
    pub count: Option<usize>,
    pub mode: Option<Mode>,
}

impl Settings {
    /// Merge a partial update. Numeric fields are clamped rather than
    /// rejected (a non-finite delay is ignored outright), an unknown
    /// category keeps the current one, and the mode is re-derived to the
    /// category's first supported mode whenever the merged pair is
    /// incompatible.
    pub fn apply(&mut self, update: SettingsUpdate, catalog: &Catalog) {
        if let Some(category) = update.category {
            if catalog.get(&category).is_some() {
                self.category = category;
            }
        }
        if let Some(delay_sec) = update.delay_sec {
            if delay_sec.is_finite() {
                self.delay_sec = delay_sec.clamp(0.0, MAX_DELAY_SECS);
            }
        }
        if let Some(count) = update.count {
            self.count = count.clamp(1, MAX_CARDS);
        }
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if !catalog.supports(&self.category, self.mode) {
            self.mode = catalog.modes_for(&self.category)[0];
        }
    }

    pub fn delay_ms(&self) -> u64 {
        (self.delay_sec * 1000.0).round() as u64
    }
}
