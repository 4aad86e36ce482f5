//! Browser platform layer
//!
//! - `timers`: cancellable `setInterval` / `requestAnimationFrame` handles
//! - `dom`: the DOM-backed [`Hud`](crate::hud::Hud)
//!
//! Everything here is wasm-only; the native build drives `GameLoop` directly.

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod timers;

#[cfg(target_arch = "wasm32")]
pub use dom::DomHud;
#[cfg(target_arch = "wasm32")]
pub use timers::{AnimationLoop, Interval, now_ms};
