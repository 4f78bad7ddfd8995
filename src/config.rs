//! Board, physics and table tuning
//!
//! Loaded from JSON; any missing field falls back to the canonical constants.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{BoardError, ConfigError};

/// Peg lattice and payout slot layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub rows: usize,
    pub pegs_in_top_row: usize,
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
    /// Y of the first peg row
    pub top_offset: f32,
    pub slot_area_height: f32,
    pub peg_diameter: f32,
    pub ball_diameter: f32,
    /// Payout multipliers, left to right
    pub multipliers: Vec<f64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: ROWS,
            pegs_in_top_row: PEGS_IN_TOP_ROW,
            horizontal_spacing: HORIZONTAL_SPACING,
            vertical_spacing: VERTICAL_SPACING,
            top_offset: TOP_OFFSET,
            slot_area_height: SLOT_AREA_HEIGHT,
            peg_diameter: PEG_DIAMETER,
            ball_diameter: BALL_DIAMETER,
            multipliers: MULTIPLIERS.to_vec(),
        }
    }
}

impl BoardConfig {
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.rows == 0 {
            return Err(BoardError::NoRows);
        }
        if self.rows > self.pegs_in_top_row {
            return Err(BoardError::TooManyRows {
                rows: self.rows,
                pegs: self.pegs_in_top_row,
            });
        }
        for spacing in [
            self.horizontal_spacing,
            self.vertical_spacing,
            self.peg_diameter,
            self.ball_diameter,
        ] {
            if !spacing.is_finite() || spacing <= 0.0 {
                return Err(BoardError::InvalidSpacing(spacing));
            }
        }
        for offset in [self.top_offset, self.slot_area_height] {
            if !offset.is_finite() || offset < 0.0 {
                return Err(BoardError::InvalidSpacing(offset));
            }
        }
        validate_multipliers(&self.multipliers)
    }
}

/// Slot multipliers must be odd in count, palindromic, peaked at the center
/// and non-increasing toward both edges.
pub fn validate_multipliers(slots: &[f64]) -> Result<(), BoardError> {
    if slots.len() % 2 == 0 {
        return Err(BoardError::EvenSlotCount(slots.len()));
    }
    for (index, &value) in slots.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(BoardError::InvalidMultiplier { index, value });
        }
    }
    if slots.iter().ne(slots.iter().rev()) {
        return Err(BoardError::AsymmetricSlots);
    }
    let center = slots.len() / 2;
    // Walking outward from the center, values may only stay or drop
    for index in 1..=center {
        if slots[index] < slots[index - 1] {
            return Err(BoardError::SlotsNotPeaked { index });
        }
    }
    Ok(())
}

/// Stepper coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub friction: f32,
    pub bounce: f32,
    pub jitter: f32,
    pub dt: f32,
    pub max_steps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            bounce: BOUNCE,
            jitter: JITTER,
            dt: SIM_DT,
            max_steps: MAX_STEPS,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |name: &'static str, value: f32| {
            if value.is_finite() && value > 0.0 && value < 1.0 {
                Ok(())
            } else {
                Err(ConfigError::Physics { name, value })
            }
        };
        unit("friction", self.friction)?;
        unit("bounce", self.bounce)?;
        if !self.gravity.is_finite() || self.gravity <= 0.0 {
            return Err(ConfigError::Physics {
                name: "gravity",
                value: self.gravity,
            });
        }
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            return Err(ConfigError::Physics {
                name: "jitter",
                value: self.jitter,
            });
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::Physics {
                name: "dt",
                value: self.dt,
            });
        }
        if self.max_steps == 0 {
            return Err(ConfigError::Physics {
                name: "max_steps",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Wager lifecycle timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Ticks a resolved drop stays on display before the table goes idle
    pub settle_ticks: u32,
    /// Frame substep cap for the fixed-timestep clock
    pub max_substeps: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            settle_ticks: SETTLE_TICKS,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

/// Complete simulator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlinkoConfig {
    pub board: BoardConfig,
    pub physics: PhysicsConfig,
    pub table: TableConfig,
}

impl PlinkoConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.validate()?;
        self.physics.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PlinkoConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = PlinkoConfig::from_json(r#"{ "physics": { "bounce": 0.6 } }"#).unwrap();
        assert_eq!(config.physics.bounce, 0.6);
        assert_eq!(config.physics.gravity, GRAVITY);
        assert_eq!(config.board, BoardConfig::default());
    }

    #[test]
    fn test_json_roundtrip_preserves_config() {
        let config = PlinkoConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(PlinkoConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_even_slot_count() {
        let err = validate_multipliers(&[1.0, 2.0, 2.0, 1.0]).unwrap_err();
        assert_eq!(err, BoardError::EvenSlotCount(4));
    }

    #[test]
    fn test_rejects_asymmetric_slots() {
        let err = validate_multipliers(&[0.5, 1.0, 5.0, 2.0, 0.5]).unwrap_err();
        assert_eq!(err, BoardError::AsymmetricSlots);
    }

    #[test]
    fn test_rejects_valley_in_slots() {
        let err = validate_multipliers(&[2.0, 1.0, 5.0, 1.0, 2.0]).unwrap_err();
        assert_eq!(err, BoardError::SlotsNotPeaked { index: 1 });
    }

    #[test]
    fn test_rejects_bounce_that_gains_energy() {
        let json = r#"{ "physics": { "bounce": 1.2 } }"#;
        assert!(matches!(
            PlinkoConfig::from_json(json),
            Err(ConfigError::Physics { name: "bounce", .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            PlinkoConfig::from_json("{ rows: "),
            Err(ConfigError::Parse(_))
        ));
    }
}
