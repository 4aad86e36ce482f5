//! In-memory audio backend
//!
//! Records every scheduled tone against a manually advanced clock. Used by
//! the native build and by tests.

use super::{AudioBackend, AudioError, Tone};

#[derive(Debug, Default)]
pub struct OfflineBackend {
    /// Audio clock (seconds)
    pub clock: f64,
    /// Every tone ever scheduled, in order
    pub scheduled: Vec<Tone>,
    /// Number of cancel requests received
    pub cancelled: usize,
    pub master_gain: f32,
    next_voice: usize,
}

impl OfflineBackend {
    pub fn new() -> Self {
        Self {
            master_gain: 1.0,
            ..Default::default()
        }
    }

    /// Move the clock forward
    pub fn advance(&mut self, seconds: f64) {
        self.clock += seconds;
    }

    pub fn voices_created(&self) -> usize {
        self.next_voice
    }

    /// Tones scheduled at a given frequency
    pub fn count_frequency(&self, frequency: f32) -> usize {
        self.scheduled
            .iter()
            .filter(|t| (t.frequency - frequency).abs() < f32::EPSILON)
            .count()
    }
}

impl AudioBackend for OfflineBackend {
    type Voice = usize;

    fn current_time(&self) -> f64 {
        self.clock
    }

    fn schedule(&mut self, tone: &Tone) -> Result<usize, AudioError> {
        self.scheduled.push(*tone);
        let id = self.next_voice;
        self.next_voice += 1;
        Ok(id)
    }

    fn cancel(&mut self, _voice: &usize) {
        self.cancelled += 1;
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.master_gain = gain;
    }
}
