//! View sink
//!
//! The game pushes primitive values out through [`Hud`] after every state
//! change and never reads anything back. The browser implementation lives in
//! `platform::dom`.

use glam::Vec2;

use crate::sim::{CountdownStep, GamePhase, PriceHistory, SessionSummary};

pub trait Hud {
    /// Show/hide the screens and controls for a phase
    fn show_phase(&mut self, phase: GamePhase);
    /// Countdown overlay; `None` removes it
    fn show_countdown(&mut self, step: Option<CountdownStep>);
    fn show_score(&mut self, score: u64);
    fn show_time(&mut self, seconds: u32);
    /// Current price plus the chart history
    fn show_price(&mut self, value: f32, history: &PriceHistory);
    fn show_summary(&mut self, summary: &SessionSummary);
    fn show_muted(&mut self, _muted: bool) {}
    /// Offset the game container (zero restores it)
    fn shake(&mut self, _offset: Vec2) {}
    /// Haptic pulse; devices without vibration ignore it
    fn vibrate(&mut self, _millis: u32) {}
}

/// Hud that writes to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogHud {
    last_time: Option<u32>,
}

impl Hud for LogHud {
    fn show_phase(&mut self, phase: GamePhase) {
        log::info!("Phase: {:?}", phase);
    }

    fn show_countdown(&mut self, step: Option<CountdownStep>) {
        if let Some(step) = step {
            log::info!("{}", step.label());
        }
    }

    fn show_score(&mut self, score: u64) {
        log::debug!("Score: {}", score);
    }

    fn show_time(&mut self, seconds: u32) {
        if self.last_time != Some(seconds) && seconds % 10 == 0 {
            log::info!("{}s left", seconds);
        }
        self.last_time = Some(seconds);
    }

    fn show_price(&mut self, value: f32, _history: &PriceHistory) {
        log::debug!("Bitcoin value: {}", value.round());
    }

    fn show_summary(&mut self, summary: &SessionSummary) {
        log::info!(
            "Final score {} ({} dollars, {} bitcoin for {} points)",
            summary.score,
            summary.dollars,
            summary.bitcoin_count,
            summary.bitcoin_points
        );
    }
}
