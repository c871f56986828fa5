//! Game entities and the alien grid
//!
//! Positions are box centres in y-up world space.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::audio::SoundEffect;
use crate::config::GameConfig;
use crate::renderer::{BLACK, Rgba};

/// Alien sprite variants, assigned in pairs of rows from the bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlienVariant {
    First,
    Second,
    Third,
}

impl AlienVariant {
    /// Variant for a grid row (row 0 is the top row)
    pub fn for_row(row: usize, rows: usize) -> Self {
        let from_bottom = rows.saturating_sub(1).saturating_sub(row);
        match (from_bottom / 2) % 3 {
            0 => AlienVariant::First,
            1 => AlienVariant::Second,
            _ => AlienVariant::Third,
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Ship {
    /// A ship at the canonical spawn point
    pub fn spawn(config: &GameConfig) -> Self {
        Self {
            pos: config.ship_spawn(),
            size: Vec2::new(config.ship_width, config.ship_height),
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    /// Shift horizontally, keeping the whole ship inside `[0, width]`
    pub fn move_by(&mut self, dx: f32, field_width: f32) {
        let half = self.size.x / 2.0;
        self.pos.x = (self.pos.x + dx).clamp(half, (field_width - half).max(half));
    }

    /// Where a freshly fired ship bolt is centred
    pub fn muzzle(&self, config: &GameConfig) -> Vec2 {
        Vec2::new(
            self.pos.x,
            config.ship_bottom + config.ship_height + config.bolt_height / 2.0,
        )
    }
}

/// One alien in the formation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alien {
    pub pos: Vec2,
    pub size: Vec2,
    pub variant: AlienVariant,
}

impl Alien {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }
}

/// A laser bolt; positive velocity moves up and belongs to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bolt {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub color: Rgba,
    /// Pixels per frame, signed
    pub velocity: f32,
}

impl Bolt {
    pub fn new(id: u32, pos: Vec2, config: &GameConfig, velocity: f32) -> Self {
        Self {
            id,
            pos,
            size: Vec2::new(config.bolt_width, config.bolt_height),
            color: BLACK,
            velocity,
        }
    }

    #[inline]
    pub fn is_player_bolt(&self) -> bool {
        self.velocity > 0.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    pub fn top(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y - self.size.y / 2.0
    }

    /// True once the bolt has fully left the vertical play bounds
    pub fn is_off_screen(&self, field_height: f32) -> bool {
        self.top() <= 0.0 || self.bottom() >= field_height
    }
}

/// Fixed rows x columns formation; cells only ever go from occupied to empty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlienGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Alien>>,
}

impl AlienGrid {
    /// Full formation laid out from the config
    pub fn new(config: &GameConfig) -> Self {
        let (rows, cols) = (config.alien_rows, config.aliens_in_row);
        let size = Vec2::new(config.alien_width, config.alien_height);
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            let y = config.alien_row_y(row);
            let variant = AlienVariant::for_row(row, rows);
            for col in 0..cols {
                cells.push(Some(Alien {
                    pos: Vec2::new(config.alien_col_x(col), y),
                    size,
                    variant,
                }));
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Alien> {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col].as_ref()
        } else {
            None
        }
    }

    /// Empty a cell, returning the alien that was there
    pub fn remove(&mut self, row: usize, col: usize) -> Option<Alien> {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col].take()
        } else {
            None
        }
    }

    /// Live aliens with their (row, col), row-major
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Alien)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.as_ref().map(|a| ((i / cols, i % cols), a)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Alien> {
        self.cells.iter_mut().flatten()
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn translate(&mut self, delta: Vec2) {
        for alien in self.iter_mut() {
            alien.pos += delta;
        }
    }

    /// Columns that still hold at least one alien, ascending
    pub fn occupied_columns(&self) -> Vec<usize> {
        (0..self.cols)
            .filter(|&col| (0..self.rows).any(|row| self.get(row, col).is_some()))
            .collect()
    }

    /// Lowest live alien in a column, with its row
    pub fn lowest_in_column(&self, col: usize) -> Option<(usize, &Alien)> {
        (0..self.rows)
            .rev()
            .find_map(|row| self.get(row, col).map(|a| (row, a)))
    }

    /// First live alien scanning rows from the bottom
    pub fn bottom_most(&self) -> Option<&Alien> {
        (0..self.rows)
            .rev()
            .find_map(|row| (0..self.cols).find_map(|col| self.get(row, col)))
    }

    /// Leftmost left edge and rightmost right edge of the live aliens
    pub fn horizontal_extent(&self) -> Option<(f32, f32)> {
        self.iter().fold(None, |acc, (_, alien)| {
            let b = alien.bounds();
            Some(match acc {
                None => (b.left(), b.right()),
                Some((l, r)) => (l.min(b.left()), r.max(b.right())),
            })
        })
    }
}

/// Notable things that happened during an update, drained by the session
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Sound to play (only raised while sound channels are attached)
    Sound(SoundEffect),
    AlienDestroyed { row: usize, col: usize, points: u64 },
    ShipDestroyed { lives_left: u32 },
    AlienVolley { col: usize },
}
