//! Recent drop results and session totals
//!
//! Keeps the last 20 settled drops (newest first) for the results strip.

use serde::{Deserialize, Serialize};

/// Maximum number of recent drops to keep
pub const MAX_RECENT_DROPS: usize = 20;

/// A settled drop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropRecord {
    pub wager_id: u64,
    pub bet: f64,
    pub slot_index: usize,
    pub multiplier: f64,
    pub payout: f64,
    /// False when the payout credit failed and is awaiting retry
    pub credited: bool,
}

/// Rolling history plus lifetime totals for a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DropHistory {
    /// Newest first
    pub recent: Vec<DropRecord>,
    pub drops: u64,
    pub total_wagered: f64,
    pub total_paid: f64,
    pub best_multiplier: Option<f64>,
    /// Landing counts per slot index
    pub slot_hits: Vec<u64>,
}

impl DropHistory {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slot_hits: vec![0; slot_count],
            ..Self::default()
        }
    }

    pub fn record(&mut self, record: DropRecord) {
        self.drops += 1;
        self.total_wagered += record.bet;
        if record.credited {
            self.total_paid += record.payout;
        }
        if self.best_multiplier.is_none_or(|best| record.multiplier > best) {
            self.best_multiplier = Some(record.multiplier);
        }
        if record.slot_index >= self.slot_hits.len() {
            self.slot_hits.resize(record.slot_index + 1, 0);
        }
        self.slot_hits[record.slot_index] += 1;

        self.recent.insert(0, record);
        self.recent.truncate(MAX_RECENT_DROPS);
    }

    /// Mark an earlier drop's payout as credited after a successful retry
    pub fn mark_credited(&mut self, wager_id: u64, payout: f64) {
        self.total_paid += payout;
        if let Some(record) = self.recent.iter_mut().find(|r| r.wager_id == wager_id) {
            record.credited = true;
        }
    }

    /// Winnings minus stakes over the session
    pub fn net(&self) -> f64 {
        self.total_paid - self.total_wagered
    }

    /// Multiplier of the most recent drop (highlighted in the slot row)
    pub fn last_multiplier(&self) -> Option<f64> {
        self.recent.first().map(|r| r.multiplier)
    }

    pub fn is_empty(&self) -> bool {
        self.drops == 0
    }
}
