//! Simulated bitcoin price
//!
//! A bounded random walk blended with a rising trend. Over the last few
//! seconds of a session the walk is overridden by a straight run to the max.

use std::collections::VecDeque;

use rand::Rng;

use crate::consts::*;

/// Threshold for a move to count as a jump worth a sound cue
pub const JUMP_THRESHOLD: f32 = 15.0;

/// Fixed-length price history, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    values: VecDeque<f32>,
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceHistory {
    /// History filled with the minimum price
    pub fn new() -> Self {
        Self {
            values: std::iter::repeat_n(PRICE_MIN, PRICE_HISTORY_LEN).collect(),
        }
    }

    /// Drop the oldest value and append `value`
    pub fn push(&mut self, value: f32) {
        self.values.pop_front();
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn latest(&self) -> Option<f32> {
        self.values.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.values.iter().copied().collect()
    }
}

/// Direction of a sudden move large enough to announce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceJump {
    Up,
    Down,
}

/// Result of one price step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceUpdate {
    pub value: f32,
    /// Random component sampled this step
    pub change: f32,
    pub sudden: bool,
    /// True when the end-of-session convergence drove the value
    pub converging: bool,
}

impl PriceUpdate {
    pub fn jump(&self) -> Option<PriceJump> {
        if !self.sudden || self.converging {
            return None;
        }
        if self.change >= JUMP_THRESHOLD {
            Some(PriceJump::Up)
        } else if self.change <= -JUMP_THRESHOLD {
            Some(PriceJump::Down)
        } else {
            None
        }
    }
}

/// Compute the next simulated price for a session with `time_left` seconds left
pub fn next_price(time_left: u32, rng: &mut impl Rng) -> PriceUpdate {
    let progress = (1.0 - time_left as f32 / SESSION_SECONDS as f32).clamp(0.0, 1.0);
    let base_trend = progress * PRICE_MAX;

    let sudden = rng.random_bool(PRICE_SUDDEN_CHANCE);
    let spread = if sudden { 60.0 } else { 30.0 };
    let change = (rng.random::<f32>() - 0.5) * spread;

    let trend_strength = (progress * 1.2).min(0.7);

    let converging = time_left <= PRICE_CONVERGE_SECONDS;
    let value = if converging {
        let window = PRICE_CONVERGE_SECONDS as f32;
        let end_progress = (window - time_left as f32) / window;
        PRICE_MAX - (1.0 - end_progress) * (PRICE_MAX - base_trend)
    } else {
        base_trend * trend_strength + change * (1.0 - trend_strength) + change
    };

    PriceUpdate {
        value: value.clamp(PRICE_MIN, PRICE_MAX),
        change,
        sudden,
        converging,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_history_starts_full_of_min() {
        let history = PriceHistory::new();
        assert_eq!(history.len(), PRICE_HISTORY_LEN);
        assert!(history.iter().all(|v| v == PRICE_MIN));
    }

    #[test]
    fn test_history_push_drops_oldest() {
        let mut history = PriceHistory::new();
        for i in 0..PRICE_HISTORY_LEN {
            history.push(i as f32);
        }
        history.push(99.0);
        let values = history.to_vec();
        assert_eq!(values.len(), PRICE_HISTORY_LEN);
        assert_eq!(values[0], 1.0);
        assert_eq!(history.latest(), Some(99.0));
    }

    #[test]
    fn test_final_second_converges_to_max() {
        let mut rng = Pcg32::seed_from_u64(3);
        let update = next_price(0, &mut rng);
        assert!(update.converging);
        assert_eq!(update.value, PRICE_MAX);
        assert_eq!(update.jump(), None);
    }

    #[test]
    fn test_convergence_is_monotonic() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut last = 0.0;
        for time_left in (0..=PRICE_CONVERGE_SECONDS).rev() {
            let value = next_price(time_left, &mut rng).value;
            assert!(value >= last, "{value} < {last} at t={time_left}");
            last = value;
        }
    }

    #[test]
    fn test_jump_classification() {
        let up = PriceUpdate {
            value: 40.0,
            change: 20.0,
            sudden: true,
            converging: false,
        };
        assert_eq!(up.jump(), Some(PriceJump::Up));

        let small = PriceUpdate { change: 10.0, ..up };
        assert_eq!(small.jump(), None);

        let normal = PriceUpdate {
            change: -20.0,
            sudden: false,
            ..up
        };
        assert_eq!(normal.jump(), None);

        let down = PriceUpdate { change: -16.0, ..up };
        assert_eq!(down.jump(), Some(PriceJump::Down));
    }

    proptest! {
        #[test]
        fn prop_price_stays_in_bounds(seed in any::<u64>(), time_left in 0u32..=SESSION_SECONDS) {
            let mut rng = Pcg32::seed_from_u64(seed);
            for _ in 0..16 {
                let update = next_price(time_left, &mut rng);
                prop_assert!(update.value >= PRICE_MIN && update.value <= PRICE_MAX);
            }
        }

        #[test]
        fn prop_history_length_is_fixed(pushes in proptest::collection::vec(0.0f32..100.0, 0..64)) {
            let mut history = PriceHistory::new();
            for v in &pushes {
                history.push(*v);
                prop_assert_eq!(history.len(), PRICE_HISTORY_LEN);
                prop_assert_eq!(history.latest(), Some(*v));
            }
        }
    }
}
