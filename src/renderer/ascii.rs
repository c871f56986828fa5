//! Character-grid surface for terminals and logs
//!
//! World space is y-up; the grid is y-down, one cell per `cell` pixels.

use glam::Vec2;

use super::{DrawSurface, Drawable, Sprite};
use crate::sim::AlienVariant;

pub struct AsciiSurface {
    cols: usize,
    rows: usize,
    cell: Vec2,
    cells: Vec<char>,
}

impl AsciiSurface {
    /// Grid covering `world` with cells of `cell` pixels
    pub fn new(world: Vec2, cell: Vec2) -> Self {
        let cols = (world.x / cell.x).ceil().max(1.0) as usize;
        let rows = (world.y / cell.y).ceil().max(1.0) as usize;
        Self {
            cols,
            rows,
            cell,
            cells: vec![' '; cols * rows],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(' ');
    }

    pub fn size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Character at (col, row), row 0 at the top
    pub fn get(&self, col: usize, row: usize) -> Option<char> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    /// The grid as newline-separated rows
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.cols + 1) * self.rows);
        for row in self.cells.chunks(self.cols) {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }

    fn to_cell(&self, p: Vec2) -> (i64, i64) {
        let col = (p.x / self.cell.x).floor() as i64;
        let row = self.rows as i64 - 1 - (p.y / self.cell.y).floor() as i64;
        (col, row)
    }

    fn put(&mut self, col: i64, row: i64, ch: char) {
        if col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows {
            self.cells[row as usize * self.cols + col as usize] = ch;
        }
    }

    fn fill_box(&mut self, center: Vec2, size: Vec2, ch: char) {
        let (c0, r1) = self.to_cell(center - size / 2.0);
        let (c1, r0) = self.to_cell(center + size / 2.0);
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.put(col, row, ch);
            }
        }
    }
}

fn sprite_char(sprite: Sprite) -> char {
    match sprite {
        Sprite::Ship => '^',
        Sprite::Alien(AlienVariant::First) => 'W',
        Sprite::Alien(AlienVariant::Second) => 'M',
        Sprite::Alien(AlienVariant::Third) => 'A',
    }
}

impl DrawSurface for AsciiSurface {
    fn draw(&mut self, shape: &Drawable) {
        match shape {
            Drawable::Sprite { center, size, sprite } => {
                self.fill_box(*center, *size, sprite_char(*sprite));
            }
            Drawable::Rect { center, size, .. } => self.fill_box(*center, *size, '|'),
            Drawable::Line { from, to, .. } => {
                let (c0, r0) = self.to_cell(*from);
                let (c1, r1) = self.to_cell(*to);
                let steps = (c1 - c0).abs().max((r1 - r0).abs()).max(1);
                for i in 0..=steps {
                    let col = c0 + (c1 - c0) * i / steps;
                    let row = r0 + (r1 - r0) * i / steps;
                    self.put(col, row, '-');
                }
            }
            Drawable::Label { center, text, .. } => {
                let lines: Vec<&str> = text.lines().collect();
                let (center_col, center_row) = self.to_cell(*center);
                let top = center_row - lines.len() as i64 / 2;
                for (i, line) in lines.iter().enumerate() {
                    let width = line.chars().count() as i64;
                    let start = center_col - width / 2;
                    for (j, ch) in line.chars().enumerate() {
                        self.put(start + j as i64, top + i as i64, ch);
                    }
                }
            }
        }
    }
}
