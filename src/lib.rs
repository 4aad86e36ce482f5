//! Coin Rush - tap the falling coins before the clock runs out
//!
//! Core modules:
//! - `sim`: Simulation (entities, price walk, hit resolution, game state)
//! - `audio`: Procedural sound effects and background melody
//! - `game`: Session controller / state machine driving sim, audio and view
//! - `renderer`: Canvas 2D drawing through the `Painter` seam
//! - `hud`: View sink the controller pushes primitive values into
//! - `platform`: Browser timers, DOM bindings and input (wasm only)
//! - `settings`: Player-facing configuration

pub mod audio;
pub mod game;
pub mod hud;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use audio::{AudioBackend, AudioError, Cue, SoundEngine};
pub use game::GameLoop;
pub use hud::Hud;
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Session length in seconds
    pub const SESSION_SECONDS: u32 = 30;
    /// Countdown steps shown before play (3, 2, 1, GO)
    pub const COUNTDOWN_STEPS: u8 = 4;

    /// Minimum milliseconds between simulation steps
    ///
    /// Just above a 60 Hz display's 16.666 ms frame, so such displays step
    /// every other animation frame (~30 Hz).
    pub const FRAME_INTERVAL_MS: f64 = 16.67;
    /// Target spawner period
    pub const SPAWN_INTERVAL_MS: i32 = 1000;
    /// Countdown timer period
    pub const TIMER_INTERVAL_MS: i32 = 1000;

    /// Target disc radius (also the hit radius)
    pub const TARGET_RADIUS: f32 = 30.0;
    /// Horizontal spawn footprint; spawns keep half of it away from the edges
    pub const TARGET_SPAWN_FOOTPRINT: f32 = 40.0;
    /// Fall speed band (pixels per frame)
    pub const TARGET_MIN_SPEED: f32 = 2.0;
    pub const TARGET_MAX_SPEED: f32 = 4.0;
    /// Rotation added to every target each frame (radians)
    pub const TARGET_SPIN: f32 = 0.02;
    /// Probability that a spawn is a bitcoin
    pub const BITCOIN_CHANCE: f64 = 0.25;

    /// Particles per hit burst
    pub const BURST_SIZE: usize = 20;
    /// Particle gravity (pixels per frame²)
    pub const PARTICLE_GRAVITY: f32 = 0.1;
    /// Life lost per frame
    pub const PARTICLE_DECAY: f32 = 0.02;
    /// Size multiplier per frame
    pub const PARTICLE_SHRINK: f32 = 0.97;

    /// Bitcoin price bounds
    pub const PRICE_MIN: f32 = 1.0;
    pub const PRICE_MAX: f32 = 100.0;
    /// Milliseconds between price updates
    pub const PRICE_UPDATE_MS: f64 = 2000.0;
    /// Price history length fed to the chart
    pub const PRICE_HISTORY_LEN: usize = 20;
    /// Seconds left when the price starts converging to the max
    pub const PRICE_CONVERGE_SECONDS: u32 = 5;
    /// Chance of a sudden price move per update
    pub const PRICE_SUDDEN_CHANCE: f64 = 0.15;

    /// Screen shake
    pub const SHAKE_DURATION_MS: f64 = 150.0;
    pub const SHAKE_INTENSITY: f32 = 5.0;

    /// Haptic pulse on hit
    pub const VIBRATE_MS: u32 = 50;

    /// Target colors
    pub const BITCOIN_COLOR: &str = "#f7931a";
    pub const DOLLAR_COLOR: &str = "#85bb65";
    /// Canvas clear color
    pub const BACKGROUND_COLOR: &str = "#0a0a0a";
}
