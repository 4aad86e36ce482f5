//! Scene drawing: starfield, targets, particles and the price chart

use glam::Vec2;

use super::Painter;
use crate::consts::{BACKGROUND_COLOR, BITCOIN_COLOR, PRICE_MAX};
use crate::sim::{GameState, Particle, PriceHistory, Starfield, Target};

const STAR_COLOR: &str = "#ffffff";
const GLYPH_COLOR: &str = "#ffffff";

/// Draw a full frame of the current state
///
/// `twinkle` off draws stars at their base brightness.
pub fn draw_frame(state: &GameState, painter: &mut impl Painter, now_ms: f64, twinkle: bool) {
    painter.fill_rect(0.0, 0.0, state.width, state.height, BACKGROUND_COLOR);
    draw_stars(&state.stars, painter, now_ms, twinkle);
    for target in &state.targets {
        draw_target(target, painter);
    }
    draw_particles(&state.particles, painter);
}

pub fn draw_stars(stars: &Starfield, painter: &mut impl Painter, now_ms: f64, twinkle: bool) {
    for star in stars.iter() {
        let opacity = if twinkle {
            star.opacity(now_ms)
        } else {
            star.brightness
        };
        painter.set_alpha(opacity.clamp(0.0, 1.0));
        painter.fill_circle(star.pos, star.size, STAR_COLOR);
    }
    painter.set_alpha(1.0);
}

/// Colored disc with the coin glyph, rotated
pub fn draw_target(target: &Target, painter: &mut impl Painter) {
    painter.save();
    painter.translate(target.pos);
    painter.rotate(target.rotation);
    painter.fill_circle(Vec2::ZERO, target.radius, target.kind.color());
    painter.fill_text(target.kind.glyph(), Vec2::ZERO, target.radius, GLYPH_COLOR);
    painter.restore();
}

/// Glyph per particle, fading with remaining life
pub fn draw_particles(particles: &[Particle], painter: &mut impl Painter) {
    for p in particles {
        painter.save();
        painter.translate(p.pos);
        painter.rotate(p.rotation);
        painter.set_alpha(p.life.clamp(0.0, 1.0));
        painter.fill_text(p.kind.glyph(), Vec2::ZERO, p.size * 2.0, p.color());
        painter.restore();
    }
    painter.set_alpha(1.0);
}

/// Line chart of the price history, y axis fixed to 0..PRICE_MAX
pub fn draw_price_chart(history: &PriceHistory, painter: &mut impl Painter, width: f32, height: f32) {
    if history.len() < 2 {
        return;
    }
    let step = width / (history.len() - 1) as f32;
    let points: Vec<Vec2> = history
        .iter()
        .enumerate()
        .map(|(i, v)| Vec2::new(i as f32 * step, height - (v / PRICE_MAX) * height))
        .collect();
    painter.stroke_polyline(&points, 1.0, BITCOIN_COLOR);
}
