use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Screen, SetupField};
use crate::session::Session;
use crate::stats::Stats;

const HORIZONTAL_MARGIN: u16 = 4;
const VERTICAL_MARGIN: u16 = 1;

pub fn draw(app: &App, f: &mut Frame) {
    match app.screen {
        Screen::Setup => render_setup(app, f),
        Screen::Game => render_game(app, f),
        Screen::Results => render_results(app, f),
    }
}

fn render_setup(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(6),
            Constraint::Length(2),
            Constraint::Min(3),
        ])
        .split(f.area());

    let title = Paragraph::new(Span::styled(
        "flipfox",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let settings = app.engine.settings();
    let rows = [
        (SetupField::Category, "category", settings.category.clone()),
        (SetupField::Mode, "mode", settings.mode.to_string()),
        (SetupField::Count, "cards", settings.count.to_string()),
        (
            SetupField::Delay,
            "reveal delay",
            format!("{:.1}s", settings.delay_sec),
        ),
    ];
    let form_lines: Vec<Line> = rows
        .into_iter()
        .map(|(field, label, value)| {
            let focused = app.setup_field == field;
            let marker = if focused { "▸ " } else { "  " };
            let style = if focused {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(
                format!("{}{:<14} {}", marker, label, value),
                style,
            ))
        })
        .collect();
    let form = Paragraph::new(form_lines)
        .block(Block::default().borders(Borders::ALL).title("practice"));
    f.render_widget(form, chunks[1]);

    let help = Paragraph::new(Span::styled(
        "↑/↓ field   ←/→ adjust   Enter start   r reset stats   q quit",
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[2]);

    let stats = Paragraph::new(stats_lines(app.engine.stats()))
        .block(Block::default().borders(Borders::ALL).title("lifetime"))
        .wrap(Wrap { trim: true });
    f.render_widget(stats, chunks[3]);
}

fn render_game(app: &App, f: &mut Frame) {
    let Some(session) = app.engine.session() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let status = Paragraph::new(Span::styled(
        format!(
            "{} · {} · card {}/{} · {}% acc",
            session.category,
            session.mode,
            (session.current_index + 1).min(session.deck.len()),
            session.deck.len(),
            session.accuracy,
        ),
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    f.render_widget(status, chunks[0]);

    if session.paused {
        let paused = Paragraph::new(Span::styled(
            "PAUSED",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        f.render_widget(paused, centered_line(chunks[1]));
    } else {
        render_card(session, f, chunks[1]);
    }

    f.render_widget(progress_gauge(session), chunks[2]);

    let help = if session.paused {
        "p resume   Esc end round".to_string()
    } else if session.holding {
        let mut keys = String::from("c continue");
        if session.last_choice.map_or(false, |last| last.was_correct) {
            keys.push_str("   w change to wrong");
        }
        keys
    } else {
        "g got it   m missed   p pause   Esc end round".to_string()
    };
    let help = Paragraph::new(Span::styled(
        help,
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}

fn render_card(session: &Session, f: &mut Frame, area: Rect) {
    let max_width = area.width.saturating_sub(2) as usize;
    let one_line = session.prompt().width() <= max_width;

    let mut lines = vec![Line::from(Span::styled(
        session.prompt().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if session.showing_answer {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            session.answer().to_string(),
            Style::default().fg(Color::Green),
        )));
    }

    let occupied = lines.len() as u16;
    let card = Paragraph::new(lines)
        .alignment(if one_line {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    f.render_widget(card, centered_block(area, occupied));
}

fn progress_gauge(session: &Session) -> Gauge {
    let (label, pct, color) = if session.holding {
        ("hold", session.hold_pct, Color::Cyan)
    } else {
        ("reveal", session.reveal_pct, Color::Blue)
    };
    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(label))
        .gauge_style(Style::default().fg(color))
        .ratio((pct / 100.0).clamp(0.0, 1.0))
}

fn render_results(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let title = Paragraph::new(Span::styled(
        "Great work!",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    if let Some(session) = app.engine.session() {
        let summary = Paragraph::new(Span::styled(
            format!(
                "seen {}   correct {}   accuracy {}%",
                session.seen, session.correct, session.accuracy
            ),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        f.render_widget(summary, chunks[1]);
    }

    let stats = Paragraph::new(stats_lines(app.engine.stats()))
        .block(Block::default().borders(Borders::ALL).title("lifetime"))
        .wrap(Wrap { trim: true });
    f.render_widget(stats, chunks[2]);

    let help = Paragraph::new(Span::styled(
        "Enter play again   Esc back to setup   q quit",
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}

fn stats_lines(stats: &Stats) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(format!(
            "games {}   cards {}   correct {}   best {}%",
            stats.total_games, stats.total_seen, stats.total_correct, stats.best_accuracy
        )),
    ];
    if let Some(last_played) = stats.last_played {
        lines.push(Line::from(format!(
            "last played {}",
            last_played.format("%c")
        )));
    }
    for (category, bucket) in stats
        .category_stats
        .iter()
        .sorted_by(|a, b| a.0.cmp(b.0))
    {
        lines.push(Line::from(format!(
            "  {}: {} games, {}/{} correct",
            category, bucket.games, bucket.correct, bucket.seen
        )));
    }
    lines
}

/// Middle row of `area`, for a single centered message.
fn centered_line(area: Rect) -> Rect {
    centered_block(area, 1)
}

/// A `height`-tall band vertically centered inside `area`.
fn centered_block(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    let top = (area.height - height) / 2;
    Rect {
        x: area.x,
        y: area.y + top,
        width: area.width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::persist::MemoryKvStore;
    use crate::settings::SettingsUpdate;
    use ratatui::{backend::TestBackend, Terminal};

    fn test_app() -> App {
        App::new(Engine::new(Box::new(MemoryKvStore::new())))
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_setup_screen() {
        let app = test_app();
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|f| draw(&app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("flipfox"));
        assert!(text.contains("category"));
        assert!(text.contains("days"));
        assert!(text.contains("lifetime"));
    }

    #[test]
    fn test_render_game_screen_hides_answer_before_reveal() {
        let mut app = test_app();
        app.engine.configure(SettingsUpdate {
            delay_sec: Some(5.0),
            ..Default::default()
        });
        app.engine.start_new_game();
        app.screen = Screen::Game;

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("reveal"));
        let answer = app.engine.session().unwrap().answer().to_string();
        assert!(!text.contains(&answer));
    }

    #[test]
    fn test_render_game_screen_shows_answer_with_zero_delay() {
        let mut app = test_app();
        app.engine.configure(SettingsUpdate {
            delay_sec: Some(0.0),
            ..Default::default()
        });
        app.engine.start_new_game();
        app.screen = Screen::Game;

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&app, f)).unwrap();

        let text = buffer_text(&terminal);
        let session = app.engine.session().unwrap();
        assert!(text.contains(session.prompt()));
        assert!(text.contains(session.answer()));
    }

    #[test]
    fn test_render_game_screen_hold_phase() {
        let mut app = test_app();
        app.engine.configure(SettingsUpdate {
            delay_sec: Some(0.0),
            ..Default::default()
        });
        app.engine.start_new_game();
        app.engine.mark(true);
        app.screen = Screen::Game;

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("hold"));
        assert!(text.contains("change to wrong"));
    }

    #[test]
    fn test_render_game_screen_paused() {
        let mut app = test_app();
        app.engine.start_new_game();
        app.engine.toggle_pause();
        app.screen = Screen::Game;

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("PAUSED"));
    }

    #[test]
    fn test_render_results_screen() {
        let mut app = test_app();
        app.engine.configure(SettingsUpdate {
            delay_sec: Some(0.0),
            count: Some(1),
            ..Default::default()
        });
        app.engine.start_new_game();
        app.engine.mark(true);
        app.engine.continue_now();
        app.screen = Screen::Results;

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Great work!"));
        assert!(text.contains("accuracy 100%"));
        assert!(text.contains("games 1"));
    }

    #[test]
    fn test_render_tiny_terminal_does_not_panic() {
        let mut app = test_app();
        app.engine.start_new_game();
        app.screen = Screen::Game;

        let backend = TestBackend::new(10, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&app, f)).unwrap();
    }
}
