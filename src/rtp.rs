//! Return-to-player estimation
//!
//! Runs many drops headlessly (no ledger) and reports how often each slot is
//! hit and what the average multiplier comes to.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::PlinkoConfig;
use crate::error::ConfigError;
use crate::sim::{Board, simulate_drop};

/// Aggregate of a batch of simulated drops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub seed: u64,
    pub drops: u64,
    pub slot_hits: Vec<u64>,
    pub multipliers: Vec<f64>,
    /// Mean multiplier over all drops (1.0 = break even)
    pub return_to_player: f64,
    pub timeouts: u64,
    pub mean_steps: f64,
    pub mean_peg_hits: f64,
}

impl DistributionReport {
    /// Observed probability of landing in each slot
    pub fn frequencies(&self) -> Vec<f64> {
        if self.drops == 0 {
            return vec![0.0; self.slot_hits.len()];
        }
        self.slot_hits
            .iter()
            .map(|&hits| hits as f64 / self.drops as f64)
            .collect()
    }

    /// One minus return to player
    pub fn house_edge(&self) -> f64 {
        1.0 - self.return_to_player
    }
}

/// Simulate `drops` balls with a fixed seed
pub fn simulate_distribution(
    config: &PlinkoConfig,
    seed: u64,
    drops: u64,
) -> Result<DistributionReport, ConfigError> {
    config.validate()?;
    let board = Board::from_config(&config.board)?;
    let mut rng = Pcg32::seed_from_u64(seed);

    let mut slot_hits = vec![0u64; board.slots.len()];
    let mut total_multiplier = 0.0;
    let mut timeouts = 0;
    let mut total_steps = 0u64;
    let mut total_peg_hits = 0u64;

    for _ in 0..drops {
        let outcome = simulate_drop(&board, &config.physics, &mut rng);
        slot_hits[outcome.slot.slot_index] += 1;
        total_multiplier += outcome.slot.multiplier;
        total_steps += outcome.steps as u64;
        total_peg_hits += outcome.peg_hits as u64;
        if outcome.timed_out {
            timeouts += 1;
        }
    }

    let per_drop = |total: f64| if drops == 0 { 0.0 } else { total / drops as f64 };
    let report = DistributionReport {
        seed,
        drops,
        slot_hits,
        multipliers: board.slots.clone(),
        return_to_player: per_drop(total_multiplier),
        timeouts,
        mean_steps: per_drop(total_steps as f64),
        mean_peg_hits: per_drop(total_peg_hits as f64),
    };

    log::info!(
        "Simulated {} drops: RTP {:.4}, {} timeouts",
        drops,
        report.return_to_player,
        timeouts
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_add_up() {
        let report = simulate_distribution(&PlinkoConfig::default(), 1, 500).unwrap();
        assert_eq!(report.slot_hits.iter().sum::<u64>(), 500);
        assert_eq!(report.timeouts, 0);
        let total: f64 = report.frequencies().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rtp_within_multiplier_range() {
        let report = simulate_distribution(&PlinkoConfig::default(), 2, 500).unwrap();
        assert!(report.return_to_player >= 0.5 && report.return_to_player <= 5.0);
        assert!(report.mean_peg_hits >= 1.0);
    }

    #[test]
    fn test_reproducible() {
        let a = simulate_distribution(&PlinkoConfig::default(), 77, 200).unwrap();
        let b = simulate_distribution(&PlinkoConfig::default(), 77, 200).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_flat_table_has_exact_rtp() {
        let mut config = PlinkoConfig::default();
        config.board.multipliers = vec![0.5, 0.5, 0.5];
        let report = simulate_distribution(&config, 3, 100).unwrap();
        assert!((report.return_to_player - 0.5).abs() < 1e-12);
        assert!((report.house_edge() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_drops() {
        let report = simulate_distribution(&PlinkoConfig::default(), 0, 0).unwrap();
        assert_eq!(report.return_to_player, 0.0);
        assert_eq!(report.frequencies(), vec![0.0; 9]);
    }
}
