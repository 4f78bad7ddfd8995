//! Peg lattice and slot geometry
//!
//! Row `r` holds `pegs_in_top_row - r` pegs, each row centered on the board,
//! so every row sits half a spacing inside the one above it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{BoardConfig, validate_multipliers};
use crate::error::BoardError;

/// Immutable board geometry, generated once per session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub rows: usize,
    pub pegs_in_top_row: usize,
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
    pub slot_area_height: f32,
    pub peg_diameter: f32,
    pub ball_diameter: f32,
    pub width: f32,
    pub height: f32,
    /// Peg centers in generation order (row by row, left to right)
    pub pegs: Vec<Vec2>,
    /// Payout multipliers, left to right
    pub slots: Vec<f64>,
}

impl Board {
    /// Build the board described by a config
    pub fn from_config(config: &BoardConfig) -> Result<Self, BoardError> {
        config.validate()?;
        let width = config.pegs_in_top_row as f32 * config.horizontal_spacing;
        let height = config.rows as f32 * config.vertical_spacing + config.slot_area_height;
        let pegs = peg_lattice(
            config.rows,
            config.pegs_in_top_row,
            config.horizontal_spacing,
            config.vertical_spacing,
            config.top_offset,
        );

        log::debug!(
            "Generated {}x{} board with {} pegs ({}x{})",
            config.rows,
            config.pegs_in_top_row,
            pegs.len(),
            width,
            height
        );

        Ok(Self {
            rows: config.rows,
            pegs_in_top_row: config.pegs_in_top_row,
            horizontal_spacing: config.horizontal_spacing,
            vertical_spacing: config.vertical_spacing,
            slot_area_height: config.slot_area_height,
            peg_diameter: config.peg_diameter,
            ball_diameter: config.ball_diameter,
            width,
            height,
            pegs,
            slots: config.multipliers.clone(),
        })
    }

    /// Replace the payout table, keeping the geometry
    pub fn with_slots(mut self, slots: Vec<f64>) -> Result<Self, BoardError> {
        validate_multipliers(&slots)?;
        self.slots = slots;
        Ok(self)
    }

    /// Y coordinate at which a falling ball has landed
    #[inline]
    pub fn slot_line(&self) -> f32 {
        self.height - self.slot_area_height
    }

    /// Center-to-center distance below which ball and peg touch
    #[inline]
    pub fn contact_distance(&self) -> f32 {
        (self.ball_diameter + self.peg_diameter) / 2.0
    }

    /// Where a new ball appears
    #[inline]
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, 0.0)
    }

    #[inline]
    pub fn slot_width(&self) -> f32 {
        self.width / self.slots.len() as f32
    }

    /// Horizontal center of a slot (for rendering the landing marker)
    pub fn slot_center(&self, index: usize) -> f32 {
        (index as f32 + 0.5) * self.slot_width()
    }
}

/// Generate a board with the canonical offsets, slot area and multipliers
pub fn generate_board(
    rows: usize,
    pegs_in_top_row: usize,
    horizontal_spacing: f32,
    vertical_spacing: f32,
) -> Result<Board, BoardError> {
    Board::from_config(&BoardConfig {
        rows,
        pegs_in_top_row,
        horizontal_spacing,
        vertical_spacing,
        ..BoardConfig::default()
    })
}

/// Peg centers for a shrinking, centered lattice
fn peg_lattice(
    rows: usize,
    pegs_in_top_row: usize,
    horizontal_spacing: f32,
    vertical_spacing: f32,
    top_offset: f32,
) -> Vec<Vec2> {
    let center_x = pegs_in_top_row as f32 * horizontal_spacing / 2.0;
    let capacity = (0..rows).map(|r| pegs_in_top_row - r).sum();
    let mut pegs = Vec::with_capacity(capacity);

    for row in 0..rows {
        let count = pegs_in_top_row - row;
        let y = top_offset + row as f32 * vertical_spacing;
        // Leftmost peg sits (count - 1) / 2 spacings left of center
        let half_span = (count as f32 - 1.0) / 2.0;
        for i in 0..count {
            let x = center_x + (i as f32 - half_span) * horizontal_spacing;
            pegs.push(Vec2::new(x, y));
        }
    }

    pegs
}
