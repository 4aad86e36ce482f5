//! Game state and core simulation types
//!
//! Everything a session mutates lives here, owned by one `GameState`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::price::PriceHistory;
use super::starfield::Starfield;
use crate::consts::*;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Start screen (or home), nothing ticks
    Idle,
    /// 3-2-1-GO before play, entities frozen
    Countdown,
    /// Active gameplay
    Running,
    /// Session over, summary shown
    Ended,
}

/// Step shown by the pre-game countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    Three,
    Two,
    One,
    Go,
}

impl CountdownStep {
    /// Step for a given number of remaining countdown ticks
    pub fn from_remaining(remaining: u8) -> Option<Self> {
        match remaining {
            4 => Some(Self::Three),
            3 => Some(Self::Two),
            2 => Some(Self::One),
            1 => Some(Self::Go),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Three => "3",
            Self::Two => "2",
            Self::One => "1",
            Self::Go => "GO!",
        }
    }
}

/// Coin flavour of a target (and of the particles it bursts into)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Dollar,
    Bitcoin,
}

impl TargetKind {
    pub fn color(&self) -> &'static str {
        match self {
            TargetKind::Dollar => DOLLAR_COLOR,
            TargetKind::Bitcoin => BITCOIN_COLOR,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            TargetKind::Dollar => "$",
            TargetKind::Bitcoin => "₿",
        }
    }
}

/// A falling coin
#[derive(Debug, Clone)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    pub kind: TargetKind,
    pub radius: f32,
    /// Pixels per frame
    pub speed: f32,
    pub rotation: f32,
}

impl Target {
    /// True once the disc is fully below the visible area
    pub fn is_below(&self, height: f32) -> bool {
        self.pos.y > height + self.radius
    }
}

/// A short-lived burst fragment
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub gravity: f32,
    /// 0-1, decreases every frame
    pub life: f32,
    pub kind: TargetKind,
}

impl Particle {
    pub fn color(&self) -> &'static str {
        self.kind.color()
    }
}

/// Per-session counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub dollars: u32,
    pub bitcoin_count: u32,
    pub bitcoin_points: u64,
}

/// End-of-session summary handed to the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u64,
    pub dollars: u32,
    pub dollar_points: u64,
    pub bitcoin_count: u32,
    pub bitcoin_points: u64,
}

/// Damped shake applied to the game container after a hit
#[derive(Debug, Clone, Default)]
pub struct ScreenShake {
    /// Set by a hit, picked up by the next frame
    pending: bool,
    started_at: Option<f64>,
    /// Offset for the current frame
    pub offset: Vec2,
}

impl ScreenShake {
    pub fn trigger(&mut self) {
        self.pending = true;
    }

    pub fn is_active(&self) -> bool {
        self.pending || self.started_at.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Advance to `now_ms`; `jitter` yields values in [-1, 1)
    pub fn update(&mut self, now_ms: f64, mut jitter: impl FnMut() -> f32) {
        if self.pending {
            self.pending = false;
            self.started_at = Some(now_ms);
        }
        let Some(start) = self.started_at else {
            self.offset = Vec2::ZERO;
            return;
        };

        let elapsed = now_ms - start;
        if elapsed < SHAKE_DURATION_MS {
            let damping = (1.0 - elapsed / SHAKE_DURATION_MS) as f32;
            self.offset = Vec2::new(jitter(), jitter()) * SHAKE_INTENSITY * damping;
        } else {
            self.started_at = None;
            self.offset = Vec2::ZERO;
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Countdown ticks left before Running (4 = showing "3")
    pub countdown_remaining: u8,
    pub score: u64,
    pub time_left: u32,
    pub stats: SessionStats,
    /// Simulated bitcoin value in [PRICE_MIN, PRICE_MAX]
    pub bitcoin_value: f32,
    pub price_history: PriceHistory,
    /// Clock time (ms) of the last price update
    pub last_price_update: f64,
    pub targets: Vec<Target>,
    pub particles: Vec<Particle>,
    pub stars: Starfield,
    pub shake: ScreenShake,
    /// Canvas size in pixels
    pub width: f32,
    pub height: f32,
    next_id: u32,
}

impl GameState {
    /// Create an idle state for a canvas of the given size
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        Self::with_star_density(seed, width, height, 1.0)
    }

    /// Like `new`, scaling the star count by `density_scale`
    pub fn with_star_density(seed: u64, width: f32, height: f32, density_scale: f32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = Starfield::new(&mut rng, width, height, density_scale);
        Self {
            rng,
            phase: GamePhase::Idle,
            countdown_remaining: 0,
            score: 0,
            time_left: SESSION_SECONDS,
            stats: SessionStats::default(),
            bitcoin_value: PRICE_MIN,
            price_history: PriceHistory::new(),
            last_price_update: 0.0,
            targets: Vec::new(),
            particles: Vec::new(),
            stars,
            shake: ScreenShake::default(),
            width,
            height,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Clear score, clock, price and entities for a fresh session
    pub fn reset_session(&mut self) {
        self.score = 0;
        self.time_left = SESSION_SECONDS;
        self.stats = SessionStats::default();
        self.bitcoin_value = PRICE_MIN;
        self.price_history = PriceHistory::new();
        self.targets.clear();
        self.particles.clear();
        self.shake.clear();
    }

    /// Fraction of the session already played (0 at start, 1 at the end)
    pub fn progress(&self) -> f32 {
        1.0 - self.time_left as f32 / SESSION_SECONDS as f32
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            dollars: self.stats.dollars,
            dollar_points: self.stats.dollars as u64,
            bitcoin_count: self.stats.bitcoin_count,
            bitcoin_points: self.stats.bitcoin_points,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }
}
