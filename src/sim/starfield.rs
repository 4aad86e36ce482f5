//! Three-layer parallax starfield
//!
//! Stars are allocated once from the viewport area and recycled: a star that
//! drops off the bottom re-enters at the top with a new x.

use glam::Vec2;
use rand::Rng;

/// Per-layer generation ranges
#[derive(Debug, Clone, Copy)]
pub struct StarLayerConfig {
    /// Pixels of viewport area per star
    pub density: f32,
    pub speed: (f32, f32),
    pub size: (f32, f32),
    pub brightness: (f32, f32),
}

/// Far, middle and near layers
pub const STAR_LAYERS: [StarLayerConfig; 3] = [
    StarLayerConfig {
        density: 25_000.0,
        speed: (0.1, 0.3),
        size: (1.0, 2.0),
        brightness: (0.3, 0.5),
    },
    StarLayerConfig {
        density: 20_000.0,
        speed: (0.3, 0.6),
        size: (1.5, 2.5),
        brightness: (0.5, 0.7),
    },
    StarLayerConfig {
        density: 15_000.0,
        speed: (0.6, 1.0),
        size: (2.0, 3.0),
        brightness: (0.7, 1.0),
    },
];

#[derive(Debug, Clone)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    /// Pixels per frame
    pub speed: f32,
    pub brightness: f32,
    /// Radians per millisecond of the twinkle sine
    pub twinkle_speed: f32,
}

impl Star {
    /// Opacity at clock time `now_ms`; x offsets the phase so stars don't pulse together
    pub fn opacity(&self, now_ms: f64) -> f32 {
        let twinkle = (now_ms * self.twinkle_speed as f64 + self.pos.x as f64).sin() as f32;
        self.brightness * (0.7 + twinkle * 0.3)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Starfield {
    pub layers: [Vec<Star>; 3],
}

fn sample(rng: &mut impl Rng, (lo, hi): (f32, f32)) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}

impl Starfield {
    pub fn new(rng: &mut impl Rng, width: f32, height: f32, density_scale: f32) -> Self {
        let mut field = Self::default();
        let area = (width * height).max(0.0);

        for (layer, config) in field.layers.iter_mut().zip(STAR_LAYERS.iter()) {
            let count = (area * density_scale / config.density).floor() as usize;
            layer.reserve_exact(count);
            for _ in 0..count {
                layer.push(Star {
                    pos: Vec2::new(rng.random::<f32>() * width, rng.random::<f32>() * height),
                    size: sample(rng, config.size),
                    speed: sample(rng, config.speed),
                    brightness: sample(rng, config.brightness),
                    twinkle_speed: rng.random::<f32>() * 0.02 + 0.01,
                });
            }
        }

        field
    }

    /// Move every star down one frame, wrapping those past `height`
    pub fn advance(&mut self, rng: &mut impl Rng, width: f32, height: f32) {
        for star in self.layers.iter_mut().flatten() {
            star.pos.y += star.speed;
            if star.pos.y > height {
                star.pos.y = 0.0;
                star.pos.x = rng.random::<f32>() * width;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Star> {
        self.layers.iter().flatten()
    }
}
