//! Drawable generation for game entities and HUD text

use glam::Vec2;

use super::{BLACK, Drawable, Sprite};
use crate::config::GameConfig;
use crate::sim::{Alien, Bolt, Ship};

/// Font size of the centred status message
pub const MESSAGE_FONT_SIZE: f32 = 50.0;
/// Font size of the HUD labels along the top
pub const HUD_FONT_SIZE: f32 = 15.0;

pub fn alien(alien: &Alien) -> Drawable {
    Drawable::Sprite {
        center: alien.pos,
        size: alien.size,
        sprite: Sprite::Alien(alien.variant),
    }
}

pub fn ship(ship: &Ship) -> Drawable {
    Drawable::Sprite {
        center: ship.pos,
        size: ship.size,
        sprite: Sprite::Ship,
    }
}

pub fn bolt(bolt: &Bolt) -> Drawable {
    Drawable::Rect {
        center: bolt.pos,
        size: bolt.size,
        color: bolt.color,
    }
}

/// Horizontal line across the play field at the defense line height
pub fn defense_line(config: &GameConfig) -> Drawable {
    Drawable::Line {
        from: Vec2::new(0.0, config.defense_line),
        to: Vec2::new(config.game_width, config.defense_line),
        width: 1.0,
        color: BLACK,
    }
}

/// Large message in the middle of the screen
pub fn message(config: &GameConfig, text: &str) -> Drawable {
    Drawable::Label {
        center: Vec2::new(config.game_width / 2.0, config.game_height / 2.0),
        text: text.to_string(),
        font_size: MESSAGE_FONT_SIZE,
    }
}

/// Sound hint in the top-left quarter
pub fn sound_label(config: &GameConfig, text: &str) -> Drawable {
    hud_label(config, config.game_width / 4.0, text)
}

/// Score readout in the top-right
pub fn score_label(config: &GameConfig, text: &str) -> Drawable {
    hud_label(config, config.game_width * 5.0 / 6.0, text)
}

fn hud_label(config: &GameConfig, x: f32, text: &str) -> Drawable {
    Drawable::Label {
        center: Vec2::new(x, config.game_height - config.alien_ceiling / 2.0),
        text: text.to_string(),
        font_size: HUD_FONT_SIZE,
    }
}
