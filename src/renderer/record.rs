//! Painter that records draw calls instead of drawing

use glam::Vec2;

use super::Painter;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: String,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: String,
    },
    Text {
        text: String,
        at: Vec2,
        px: f32,
        color: String,
    },
    Polyline(Vec<Vec2>),
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f32),
    Alpha(f32),
}

#[derive(Debug, Default)]
pub struct RecordingPainter {
    pub commands: Vec<DrawCommand>,
}

impl RecordingPainter {
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// (text, color) of every text draw
    pub fn texts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, color, .. } => Some((text.as_str(), color.as_str())),
            _ => None,
        })
    }

    /// (radius, color) of every circle draw
    pub fn circles(&self) -> impl Iterator<Item = (f32, &str)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Circle { radius, color, .. } => Some((*radius, color.as_str())),
            _ => None,
        })
    }
}

impl Painter for RecordingPainter {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str) {
        self.commands.push(DrawCommand::Rect {
            x,
            y,
            w,
            h,
            color: color.to_string(),
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color: color.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, at: Vec2, px: f32, color: &str) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            px,
            color: color.to_string(),
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], _width: f32, _color: &str) {
        self.commands.push(DrawCommand::Polyline(points.to_vec()));
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, by: Vec2) {
        self.commands.push(DrawCommand::Translate(by));
    }

    fn rotate(&mut self, angle: f32) {
        self.commands.push(DrawCommand::Rotate(angle));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::Alpha(alpha));
    }
}
