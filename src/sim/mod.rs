//! Simulation module
//!
//! All gameplay logic lives here. This module must stay platform-free:
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or DOM dependencies

pub mod hit;
pub mod price;
pub mod starfield;
pub mod state;
pub mod tick;

pub use hit::{pick_target, point_in_disc};
pub use price::{PriceHistory, PriceJump, PriceUpdate, next_price};
pub use starfield::{STAR_LAYERS, Star, StarLayerConfig, Starfield};
pub use state::{
    CountdownStep, GamePhase, GameState, Particle, ScreenShake, SessionStats, SessionSummary,
    Target, TargetKind,
};
pub use tick::{FrameOutcome, Hit, resolve_click, spawn_burst, spawn_target, step_frame};
