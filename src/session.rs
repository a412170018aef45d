use crate::catalog::{Catalog, Mode};
use crate::deck::{card_for, Card, Deck};
use crate::TICK_RATE_MS;

/// The single grade that may still be amended during the hold phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastChoice {
    pub pool_index: usize,
    pub was_correct: bool,
}

/// The one countdown that may be outstanding at a time. Reveal and hold
/// share this slot, so the two can never run concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveTimer {
    Reveal { elapsed_ms: u64 },
    Hold { elapsed_ms: u64 },
}

/// One live quiz run, advanced by engine commands and event-loop ticks.
/// Becomes immutable once `finished` is true, apart from the one-shot
/// amendment of the last grade.
#[derive(Debug)]
pub struct Session {
    pub deck: Deck,
    pub category: String,
    pub mode: Mode,
    pub delay_ms: u64,
    pub hold_ms: u64,
    cards: Vec<Card>,
    pub current_index: usize,
    pub seen: u32,
    pub correct: u32,
    pub accuracy: u8,
    pub showing_answer: bool,
    pub reveal_pct: f64,
    pub hold_pct: f64,
    pub holding: bool,
    pub paused: bool,
    pub finished: bool,
    pub last_choice: Option<LastChoice>,
    timer: Option<ActiveTimer>,
}

impl Session {
    pub fn new(
        catalog: &Catalog,
        deck: Deck,
        category: &str,
        mode: Mode,
        delay_ms: u64,
        hold_ms: u64,
    ) -> Self {
        let cards = deck
            .order
            .iter()
            .map(|&pool_idx| match deck.pool.get(pool_idx) {
                Some(item) => card_for(catalog, item, mode),
                None => Card::placeholder(),
            })
            .collect();

        Self {
            deck,
            category: category.to_string(),
            mode,
            delay_ms,
            hold_ms,
            cards,
            current_index: 0,
            seen: 0,
            correct: 0,
            accuracy: 0,
            showing_answer: delay_ms == 0,
            reveal_pct: 0.0,
            hold_pct: 0.0,
            holding: false,
            paused: false,
            finished: false,
            last_choice: None,
            timer: None,
        }
    }

    pub fn prompt(&self) -> &str {
        self.cards
            .get(self.current_index)
            .map_or("—", |card| card.prompt.as_str())
    }

    pub fn answer(&self) -> &str {
        self.cards
            .get(self.current_index)
            .map_or("", |card| card.answer.as_str())
    }

    pub fn reveal_timer_active(&self) -> bool {
        matches!(self.timer, Some(ActiveTimer::Reveal { .. }))
    }

    pub fn hold_timer_active(&self) -> bool {
        matches!(self.timer, Some(ActiveTimer::Hold { .. }))
    }

    /// Arm the reveal countdown for the current card. No-op when there is
    /// no delay, or while paused, holding, or finished. Restarting an
    /// already-running countdown resets it.
    pub fn start_reveal_timer(&mut self) {
        if self.delay_ms == 0 || self.paused || self.finished || self.holding {
            return;
        }
        self.reveal_pct = 0.0;
        self.timer = Some(ActiveTimer::Reveal { elapsed_ms: 0 });
    }

    /// Cancel the reveal countdown if one is running. The hold countdown
    /// is not affected.
    pub fn stop_reveal_timer(&mut self) {
        if self.reveal_timer_active() {
            self.timer = None;
        }
    }

    /// Flip the pause flag. Pausing cancels whichever countdown is
    /// outstanding; resuming does not rearm it. The caller re-invokes
    /// `start_reveal_timer`, mirroring the normal post-advance sequence.
    pub fn toggle_pause(&mut self) {
        if self.finished {
            return;
        }
        self.paused = !self.paused;
        if self.paused {
            self.timer = None;
        }
    }

    /// Self-grade the current card and enter the hold phase.
    pub fn mark(&mut self, was_correct: bool) {
        if self.finished {
            return;
        }
        self.timer = None;
        self.showing_answer = true;
        self.seen += 1;
        if was_correct {
            self.correct += 1;
        }
        self.accuracy = compute_accuracy(self.correct, self.seen);
        self.last_choice = self
            .deck
            .order
            .get(self.current_index)
            .map(|&pool_index| LastChoice {
                pool_index,
                was_correct,
            });
        self.holding = true;
        self.hold_pct = 0.0;
        if self.hold_ms == 0 {
            self.advance();
            self.start_reveal_timer();
        } else {
            self.timer = Some(ActiveTimer::Hold { elapsed_ms: 0 });
        }
    }

    /// Leave the hold phase early. Ends in the same state as letting the
    /// hold countdown expire naturally, just sooner.
    pub fn continue_now(&mut self) {
        if !self.holding || self.finished {
            return;
        }
        self.timer = None;
        self.advance();
        self.start_reveal_timer();
    }

    /// Amend the last grade from correct to wrong. A narrow one-step
    /// undo: no-op when there is no last grade or it was already wrong.
    pub fn change_last_to_wrong(&mut self) {
        if let Some(last) = self.last_choice.as_mut() {
            if last.was_correct {
                last.was_correct = false;
                self.correct = self.correct.saturating_sub(1);
                self.accuracy = compute_accuracy(self.correct, self.seen);
            }
        }
    }

    /// Terminate immediately without completing the remaining order.
    pub fn end_now(&mut self) {
        if self.finished {
            return;
        }
        self.timer = None;
        self.holding = false;
        self.finished = true;
        self.reveal_pct = 100.0;
    }

    /// Advance whichever countdown occupies the timer slot by one tick.
    /// Inert while paused or finished.
    pub fn on_tick(&mut self) {
        if self.paused || self.finished {
            return;
        }
        match self.timer {
            Some(ActiveTimer::Reveal { elapsed_ms }) => {
                let elapsed_ms = elapsed_ms + TICK_RATE_MS;
                self.reveal_pct = progress_pct(elapsed_ms, self.delay_ms);
                if elapsed_ms >= self.delay_ms {
                    self.showing_answer = true;
                    self.timer = None;
                } else {
                    self.timer = Some(ActiveTimer::Reveal { elapsed_ms });
                }
            }
            Some(ActiveTimer::Hold { elapsed_ms }) => {
                let elapsed_ms = elapsed_ms + TICK_RATE_MS;
                self.hold_pct = progress_pct(elapsed_ms, self.hold_ms);
                if elapsed_ms >= self.hold_ms {
                    self.timer = None;
                    self.advance();
                    self.start_reveal_timer();
                } else {
                    self.timer = Some(ActiveTimer::Hold { elapsed_ms });
                }
            }
            None => {}
        }
    }

    /// Move to the next card, or to the terminal state from the last one.
    fn advance(&mut self) {
        if self.current_index + 1 >= self.deck.len() {
            self.finished = true;
            self.holding = false;
            self.hold_pct = 0.0;
            self.reveal_pct = 100.0;
            return;
        }
        self.current_index += 1;
        self.showing_answer = self.delay_ms == 0;
        self.reveal_pct = 0.0;
        self.holding = false;
        self.hold_pct = 0.0;
    }
}

fn compute_accuracy(correct: u32, seen: u32) -> u8 {
    if seen == 0 {
        0
    } else {
        ((correct as f64 / seen as f64) * 100.0).round() as u8
    }
}

fn progress_pct(elapsed_ms: u64, total_ms: u64) -> f64 {
    if total_ms == 0 {
        100.0
    } else {
        (elapsed_ms as f64 / total_ms as f64 * 100.0).min(100.0)
    }
}
