//! Landing slot and payout multiplier lookup

use serde::{Deserialize, Serialize};

/// Where a ball landed and what it pays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotHit {
    pub slot_index: usize,
    pub multiplier: f64,
}

/// Map a final x coordinate to its slot
///
/// Positions left of the board, right of it, or non-finite are clamped to the
/// nearest edge slot. `slots` must not be empty.
pub fn resolve_slot(final_x: f32, board_width: f32, slots: &[f64]) -> SlotHit {
    debug_assert!(!slots.is_empty());
    let last = slots.len().saturating_sub(1);
    let slot_width = board_width / slots.len() as f32;

    let raw = (final_x / slot_width).floor();
    let slot_index = if raw.is_nan() || raw <= 0.0 {
        0
    } else {
        // Saturating cast, +inf lands on the last slot
        (raw as usize).min(last)
    };

    SlotHit {
        slot_index,
        multiplier: slots[slot_index],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MULTIPLIERS;
    use proptest::prelude::*;

    const WIDTH: f32 = 360.0;

    #[test]
    fn test_edges_pay_the_same() {
        let left = resolve_slot(0.5, WIDTH, &MULTIPLIERS);
        let right = resolve_slot(WIDTH - 0.5, WIDTH, &MULTIPLIERS);
        assert_eq!(left.slot_index, 0);
        assert_eq!(right.slot_index, MULTIPLIERS.len() - 1);
        assert_eq!(left.multiplier, right.multiplier);
    }

    #[test]
    fn test_multipliers_are_palindrome() {
        let reversed: Vec<f64> = MULTIPLIERS.iter().rev().copied().collect();
        assert_eq!(reversed, MULTIPLIERS.to_vec());
    }

    #[test]
    fn test_center_pays_peak() {
        let hit = resolve_slot(WIDTH / 2.0, WIDTH, &MULTIPLIERS);
        assert_eq!(hit.slot_index, 4);
        assert_eq!(hit.multiplier, 5.0);
    }

    #[test]
    fn test_right_edge_and_beyond_clamp_to_last() {
        let last = MULTIPLIERS.len() - 1;
        assert_eq!(resolve_slot(WIDTH, WIDTH, &MULTIPLIERS).slot_index, last);
        assert_eq!(resolve_slot(WIDTH + 100.0, WIDTH, &MULTIPLIERS).slot_index, last);
        assert_eq!(resolve_slot(f32::INFINITY, WIDTH, &MULTIPLIERS).slot_index, last);
    }

    #[test]
    fn test_left_of_board_and_nan_clamp_to_first() {
        assert_eq!(resolve_slot(-25.0, WIDTH, &MULTIPLIERS).slot_index, 0);
        assert_eq!(resolve_slot(f32::NAN, WIDTH, &MULTIPLIERS).slot_index, 0);
    }

    #[test]
    fn test_slot_boundaries() {
        // 9 slots of width 40
        assert_eq!(resolve_slot(39.9, WIDTH, &MULTIPLIERS).slot_index, 0);
        assert_eq!(resolve_slot(40.0, WIDTH, &MULTIPLIERS).slot_index, 1);
        assert_eq!(resolve_slot(200.0, WIDTH, &MULTIPLIERS).slot_index, 5);
    }

    proptest! {
        #[test]
        fn prop_resolve_is_pure_and_in_range(x in -1000.0f32..1000.0) {
            let a = resolve_slot(x, WIDTH, &MULTIPLIERS);
            let b = resolve_slot(x, WIDTH, &MULTIPLIERS);
            prop_assert_eq!(a, b);
            prop_assert!(a.slot_index < MULTIPLIERS.len());
            prop_assert_eq!(a.multiplier, MULTIPLIERS[a.slot_index]);
        }

        #[test]
        fn prop_mirrored_positions_pay_the_same(x in 0.001f32..359.999) {
            let a = resolve_slot(x, WIDTH, &MULTIPLIERS);
            let b = resolve_slot(WIDTH - x, WIDTH, &MULTIPLIERS);
            // Exact slot boundaries may fall on either side
            if (x / 40.0).fract() > 1e-3 && (x / 40.0).fract() < 1.0 - 1e-3 {
                prop_assert_eq!(a.multiplier, b.multiplier);
            }
        }
    }
}
