use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::engine::Engine;
use crate::settings::SettingsUpdate;

/// Which screen the terminal is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Game,
    Results,
}

/// Focused row of the setup form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Category,
    Mode,
    Count,
    Delay,
}

impl SetupField {
    fn next(self) -> Self {
        match self {
            SetupField::Category => SetupField::Mode,
            SetupField::Mode => SetupField::Count,
            SetupField::Count => SetupField::Delay,
            SetupField::Delay => SetupField::Category,
        }
    }

    fn prev(self) -> Self {
        match self {
            SetupField::Category => SetupField::Delay,
            SetupField::Mode => SetupField::Category,
            SetupField::Count => SetupField::Mode,
            SetupField::Delay => SetupField::Count,
        }
    }
}

/// Top-level application state: the engine plus screen navigation.
pub struct App {
    pub engine: Engine,
    pub screen: Screen,
    pub setup_field: SetupField,
    pub should_quit: bool,
}

/// Delay adjustment step on the setup form, in seconds.
const DELAY_STEP: f64 = 0.5;

impl App {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            screen: Screen::Setup,
            setup_field: SetupField::Category,
            should_quit: false,
        }
    }

    pub fn on_tick(&mut self) {
        self.engine.on_tick();
        self.sync_screen();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if key.code == KeyCode::Char('q') {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Setup => self.handle_setup_key(key),
            Screen::Game => self.handle_game_key(key),
            Screen::Results => self.handle_results_key(key),
        }
        self.sync_screen();
    }

    fn handle_setup_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.setup_field = self.setup_field.prev(),
            KeyCode::Down | KeyCode::Tab => self.setup_field = self.setup_field.next(),
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                self.engine.start_new_game();
                self.screen = Screen::Game;
            }
            KeyCode::Char('r') => self.engine.reset_statistics(),
            _ => {}
        }
    }

    fn handle_game_key(&mut self, key: KeyEvent) {
        let (paused, holding) = match self.engine.session() {
            Some(session) => (session.paused, session.holding),
            None => {
                self.screen = Screen::Setup;
                return;
            }
        };

        if paused {
            match key.code {
                KeyCode::Char('p') => {
                    self.engine.toggle_pause();
                    // resuming does not rearm the countdown by itself
                    self.engine.start_timer();
                }
                KeyCode::Esc => self.engine.end_now(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('p') => self.engine.toggle_pause(),
            KeyCode::Esc => self.engine.end_now(),
            _ if holding => match key.code {
                KeyCode::Char('c') | KeyCode::Enter => self.engine.continue_now(),
                KeyCode::Char('w') => self.engine.change_last_to_wrong(),
                _ => {}
            },
            KeyCode::Char('g') => self.engine.mark(true),
            KeyCode::Char('m') => self.engine.mark(false),
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char('n') => {
                self.engine.start_new_game();
                self.screen = Screen::Game;
            }
            KeyCode::Esc | KeyCode::Char('b') => {
                self.engine.dismiss_results();
                self.screen = Screen::Setup;
            }
            _ => {}
        }
    }

    /// Step the focused setup field left or right, routing the change
    /// through the engine so it clamps and persists.
    fn adjust_field(&mut self, direction: i32) {
        let settings = self.engine.settings().clone();
        let update = match self.setup_field {
            SetupField::Category => {
                let keys = self.engine.catalog().keys();
                let next = cycled(&keys, &settings.category.as_str(), direction);
                SettingsUpdate {
                    category: next.map(|key| key.to_string()),
                    ..Default::default()
                }
            }
            SetupField::Mode => {
                let modes = self.engine.catalog().modes_for(&settings.category);
                let next = cycled(&modes, &settings.mode, direction);
                SettingsUpdate {
                    mode: next.copied(),
                    ..Default::default()
                }
            }
            SetupField::Count => {
                let count = if direction < 0 {
                    settings.count.saturating_sub(1)
                } else {
                    settings.count + 1
                };
                SettingsUpdate {
                    count: Some(count),
                    ..Default::default()
                }
            }
            SetupField::Delay => {
                let delay = settings.delay_sec + f64::from(direction) * DELAY_STEP;
                SettingsUpdate {
                    delay_sec: Some(delay.max(0.0)),
                    ..Default::default()
                }
            }
        };
        self.engine.configure(update);
    }

    /// A session that finished on its own (hold expiry during a tick)
    /// moves the app to the results screen.
    fn sync_screen(&mut self) {
        if self.screen == Screen::Game && self.engine.results_open() {
            self.screen = Screen::Results;
        }
    }
}

/// Neighbor of `current` in `items`, wrapping at both ends.
fn cycled<'a, T: PartialEq>(items: &'a [T], current: &T, direction: i32) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let pos = items.iter().position(|item| item == current).unwrap_or(0);
    let len = items.len() as i32;
    let next = (pos as i32 + direction).rem_euclid(len) as usize;
    items.get(next)
}
