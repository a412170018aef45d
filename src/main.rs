use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

use flipfox::app::App;
use flipfox::catalog::Mode;
use flipfox::engine::{Engine, DEFAULT_HOLD_MS};
use flipfox::persist::FileKvStore;
use flipfox::runtime::{AppEvent, EventSource, FixedTicker, Runner, TerminalEventSource, Ticker};
use flipfox::settings::SettingsUpdate;
use flipfox::ui;
use flipfox::TICK_RATE_MS;

/// terminal flashcards with timed reveal, self-grading, and lifetime statistics
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal flashcard trainer: shuffled prompts from built-in vocabulary categories, a timed answer reveal, self-grading with a short correction window, and persistent practice statistics."
)]
pub struct Cli {
    /// vocabulary category to practice
    #[clap(short = 'c', long)]
    category: Option<String>,

    /// number of cards in a round
    #[clap(short = 'n', long)]
    count: Option<usize>,

    /// seconds before the answer is revealed (0 shows it immediately)
    #[clap(short = 'd', long)]
    delay: Option<f64>,

    /// quiz direction
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// milliseconds the post-grade correction window stays open
    #[clap(long, default_value_t = DEFAULT_HOLD_MS)]
    hold_ms: u64,
}

impl Cli {
    /// Settings fields provided on the command line; unset flags leave
    /// the persisted settings untouched.
    fn to_settings_update(&self) -> SettingsUpdate {
        SettingsUpdate {
            category: self.category.clone(),
            delay_sec: self.delay,
            count: self.count,
            mode: self.mode,
        }
    }

    fn has_overrides(&self) -> bool {
        self.category.is_some() || self.count.is_some() || self.delay.is_some() || self.mode.is_some()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut engine = Engine::new(Box::new(FileKvStore::new())).with_hold_ms(cli.hold_ms);
    if cli.has_overrides() {
        engine.configure(cli.to_settings_update());
    }
    let mut app = App::new(engine);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        TerminalEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    run(&mut terminal, &mut app, &runner)?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

fn run<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                app.on_tick();
            }
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                app.handle_key(key);
            }
        }
        if app.should_quit {
            break;
        }
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use flipfox::persist::MemoryKvStore;

    fn test_app(cli: &Cli) -> App {
        let mut engine = Engine::new(Box::new(MemoryKvStore::new())).with_hold_ms(cli.hold_ms);
        if cli.has_overrides() {
            engine.configure(cli.to_settings_update());
        }
        App::new(engine)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["flipfox"]);

        assert_eq!(cli.category, None);
        assert_eq!(cli.count, None);
        assert_eq!(cli.delay, None);
        assert!(cli.mode.is_none());
        assert_eq!(cli.hold_ms, DEFAULT_HOLD_MS);
        assert!(!cli.has_overrides());
    }

    #[test]
    fn test_cli_category() {
        let cli = Cli::parse_from(["flipfox", "-c", "animals"]);
        assert_eq!(cli.category.as_deref(), Some("animals"));

        let cli = Cli::parse_from(["flipfox", "--category", "food"]);
        assert_eq!(cli.category.as_deref(), Some("food"));
    }

    #[test]
    fn test_cli_count_and_delay() {
        let cli = Cli::parse_from(["flipfox", "-n", "12", "-d", "1.5"]);

        assert_eq!(cli.count, Some(12));
        assert_eq!(cli.delay, Some(1.5));
        assert!(cli.has_overrides());
    }

    #[test]
    fn test_cli_mode() {
        let cli = Cli::parse_from(["flipfox", "-m", "emoji-to-word"]);
        assert_eq!(cli.mode, Some(Mode::EmojiToWord));

        let cli = Cli::parse_from(["flipfox", "--mode", "word-to-num"]);
        assert_eq!(cli.mode, Some(Mode::WordToNum));
    }

    #[test]
    fn test_cli_hold_ms() {
        let cli = Cli::parse_from(["flipfox", "--hold-ms", "2000"]);
        assert_eq!(cli.hold_ms, 2000);
    }

    #[test]
    fn test_cli_overrides_reach_settings() {
        let cli = Cli::parse_from(["flipfox", "-c", "colors", "-n", "4", "-d", "0"]);
        let app = test_app(&cli);

        let settings = app.engine.settings();
        assert_eq!(settings.category, "colors");
        assert_eq!(settings.count, 4);
        assert_eq!(settings.delay_sec, 0.0);
        // colors is unordered, so the mode re-derives to an emoji mode
        assert_eq!(settings.mode, Mode::EmojiToWord);
    }

    #[test]
    fn test_cli_without_overrides_keeps_persisted_settings() {
        let cli = Cli::parse_from(["flipfox"]);
        let app = test_app(&cli);

        assert_eq!(app.engine.settings().category, "days");
        assert_eq!(app.engine.settings().count, 7);
    }

    #[test]
    fn test_run_loop_quits_on_q() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
        use flipfox::runtime::TestEventSource;
        use ratatui::backend::TestBackend;
        use std::sync::mpsc;

        let cli = Cli::parse_from(["flipfox", "-d", "0"]);
        let mut app = test_app(&cli);

        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Key(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        )))
        .unwrap();
        tx.send(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('g'),
            KeyModifiers::NONE,
        )))
        .unwrap();
        tx.send(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
        )))
        .unwrap();

        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        run(&mut terminal, &mut app, &runner).unwrap();

        assert!(app.should_quit);
        assert_eq!(app.engine.session().unwrap().seen, 1);
    }
}
