use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::deck::Deck;
use crate::persist::{KvStore, SETTINGS_KEY, STATS_KEY};
use crate::session::Session;
use crate::settings::{Settings, SettingsUpdate};
use crate::stats::Stats;

/// How long the post-grade grace window stays open.
pub const DEFAULT_HOLD_MS: u64 = 1500;

/// The session engine. Owns the catalog, the persisted settings and
/// lifetime statistics, the store handle, and the live session. The UI
/// reads state through the borrow accessors and mutates only through
/// the commands below; persistence is best-effort write-through.
pub struct Engine {
    catalog: Catalog,
    store: Box<dyn KvStore>,
    settings: Settings,
    stats: Stats,
    session: Option<Session>,
    hold_ms: u64,
    results_open: bool,
    session_recorded: bool,
}

impl Engine {
    /// Load settings and statistics from the store, falling back to
    /// defaults when a key is missing or unreadable. Loaded settings go
    /// through the same merge path as live updates, so out-of-range
    /// values in the store are clamped rather than trusted.
    pub fn new(store: Box<dyn KvStore>) -> Self {
        let catalog = Catalog::load();
        let loaded: Settings = load_record(store.as_ref(), SETTINGS_KEY);
        let mut settings = Settings::default();
        settings.apply(
            SettingsUpdate {
                category: Some(loaded.category),
                delay_sec: Some(loaded.delay_sec),
                count: Some(loaded.count),
                mode: Some(loaded.mode),
            },
            &catalog,
        );
        let stats: Stats = load_record(store.as_ref(), STATS_KEY);

        Self {
            catalog,
            store,
            settings,
            stats,
            session: None,
            hold_ms: DEFAULT_HOLD_MS,
            results_open: false,
            session_recorded: false,
        }
    }

    pub fn with_hold_ms(mut self, hold_ms: u64) -> Self {
        self.hold_ms = hold_ms;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn results_open(&self) -> bool {
        self.results_open
    }

    /// Merge a partial settings update and persist the result. Does not
    /// start a session; callers follow up with `start_new_game`.
    pub fn configure(&mut self, update: SettingsUpdate) {
        self.settings.apply(update, &self.catalog);
        save_record(self.store.as_ref(), SETTINGS_KEY, &self.settings);
    }

    /// Deal a fresh session from the current settings and arm the reveal
    /// countdown for its first card. Any previous session is discarded
    /// along with its timers.
    pub fn start_new_game(&mut self) {
        let deck = Deck::deal(&self.catalog, &self.settings.category, self.settings.count);
        let mut session = Session::new(
            &self.catalog,
            deck,
            &self.settings.category,
            self.settings.mode,
            self.settings.delay_ms(),
            self.hold_ms,
        );
        session.start_reveal_timer();
        self.session = Some(session);
        self.session_recorded = false;
        self.results_open = false;
    }

    pub fn start_timer(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.start_reveal_timer();
        }
    }

    pub fn stop_timer(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.stop_reveal_timer();
        }
    }

    pub fn toggle_pause(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.toggle_pause();
        }
    }

    pub fn mark(&mut self, was_correct: bool) {
        if let Some(session) = self.session.as_mut() {
            session.mark(was_correct);
        }
        self.record_if_finished();
    }

    pub fn continue_now(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.continue_now();
        }
        self.record_if_finished();
    }

    pub fn change_last_to_wrong(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.change_last_to_wrong();
        }
    }

    pub fn end_now(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.end_now();
        }
        self.record_if_finished();
    }

    pub fn on_tick(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.on_tick();
        }
        self.record_if_finished();
    }

    /// Close the results view and drop the finished session. Settings
    /// and statistics are untouched.
    pub fn dismiss_results(&mut self) {
        self.results_open = false;
        self.session = None;
    }

    /// Zero the lifetime statistics and persist the empty record. An
    /// in-progress session is unaffected.
    pub fn reset_statistics(&mut self) {
        self.stats = Stats::default();
        save_record(self.store.as_ref(), STATS_KEY, &self.stats);
    }

    /// Fold a freshly finished session into the lifetime statistics,
    /// exactly once per session on any termination path. Sessions that
    /// ended before a single card was graded do not count as played.
    fn record_if_finished(&mut self) {
        let session = match self.session.as_ref() {
            Some(session) => session,
            None => return,
        };
        if !session.finished || self.session_recorded {
            return;
        }
        self.session_recorded = true;
        self.results_open = true;
        if session.seen > 0 {
            self.stats.record_session(
                &session.category,
                session.seen,
                session.correct,
                session.accuracy,
            );
            save_record(self.store.as_ref(), STATS_KEY, &self.stats);
        }
    }
}

fn load_record<T: DeserializeOwned + Default>(store: &dyn KvStore, key: &str) -> T {
    match store.get(key) {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("discarding unreadable {} record: {}", key, err);
                T::default()
            }
        },
        None => T::default(),
    }
}

fn save_record<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) {
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(err) => {
            log::warn!("failed to serialize {} record: {}", key, err);
            return;
        }
    };
    if let Err(err) = store.set(key, &json) {
        log::warn!("failed to persist {} record: {}", key, err);
    }
}
