//! Canvas 2D rendering module
//!
//! Scene drawing is written against the [`Painter`] trait so it runs (and is
//! tested) without a browser. `CanvasPainter` forwards to a real
//! `CanvasRenderingContext2d` on wasm.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod record;
pub mod scene;

use glam::Vec2;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;
pub use record::{DrawCommand, RecordingPainter};
pub use scene::{draw_frame, draw_price_chart};

/// Immediate-mode 2D drawing surface
pub trait Painter {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str);
    /// Centered text at `at` using a `{px}px Arial` font
    fn fill_text(&mut self, text: &str, at: Vec2, px: f32, color: &str);
    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: &str);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, by: Vec2);
    fn rotate(&mut self, angle: f32);
    fn set_alpha(&mut self, alpha: f32);
}

/// Painter that draws nothing (headless runs)
#[derive(Debug, Default)]
pub struct NullPainter;

impl Painter for NullPainter {
    fn fill_rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: &str) {}
    fn fill_circle(&mut self, _: Vec2, _: f32, _: &str) {}
    fn fill_text(&mut self, _: &str, _: Vec2, _: f32, _: &str) {}
    fn stroke_polyline(&mut self, _: &[Vec2], _: f32, _: &str) {}
    fn save(&mut self) {}
    fn restore(&mut self) {}
    fn translate(&mut self, _: Vec2) {}
    fn rotate(&mut self, _: f32) {}
    fn set_alpha(&mut self, _: f32) {}
}
