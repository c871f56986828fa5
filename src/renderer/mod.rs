//! Draw-surface seam
//!
//! The core describes what to draw as [`Drawable`] values and hands them to a
//! [`DrawSurface`]. It never reads pixels back.

pub mod ascii;
pub mod shapes;

use glam::Vec2;

use crate::sim::AlienVariant;

pub use ascii::AsciiSurface;

/// Linear RGBA color
pub type Rgba = [f32; 4];

pub const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];

/// Sprite references a frontend resolves to images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sprite {
    Ship,
    Alien(AlienVariant),
}

/// An opaque shape or text descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    /// Image centred at `center`
    Sprite { center: Vec2, size: Vec2, sprite: Sprite },
    /// Filled axis-aligned rectangle
    Rect { center: Vec2, size: Vec2, color: Rgba },
    /// Straight line segment
    Line { from: Vec2, to: Vec2, width: f32, color: Rgba },
    /// Text centred at `center`; may contain newlines
    Label { center: Vec2, text: String, font_size: f32 },
}

/// Anything that can render drawables
pub trait DrawSurface {
    fn draw(&mut self, shape: &Drawable);
}

/// Surface that keeps every drawable it receives, in order
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub shapes: Vec<Drawable>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Text of every label drawn, in order
    pub fn labels(&self) -> Vec<&str> {
        self.shapes
            .iter()
            .filter_map(|s| match s {
                Drawable::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of sprites of the given kind
    pub fn count_sprites(&self, pred: impl Fn(&Sprite) -> bool) -> usize {
        self.shapes
            .iter()
            .filter(|s| matches!(s, Drawable::Sprite { sprite, .. } if pred(sprite)))
            .count()
    }
}

impl DrawSurface for RecordingSurface {
    fn draw(&mut self, shape: &Drawable) {
        self.shapes.push(shape.clone());
    }
}
