//! Wager lifecycle for one player session
//!
//! `Idle -> Committed -> Resolved -> Idle`. The bet is debited before the ball
//! spawns, the payout is credited once it lands, and the result stays on
//! display for a short settle period. Only one wager can be in flight; drop
//! requests made meanwhile are rejected, never queued.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::{PhysicsConfig, PlinkoConfig, TableConfig};
use crate::error::{ConfigError, LedgerError, WagerError};
use crate::history::{DropHistory, DropRecord};
use crate::ledger::{GameCategory, Ledger};
use crate::sim::{Ball, Board, DropOutcome, DropProgress, DropRun, FixedClock, Scheduler, StepEvent};

/// A placed bet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wager {
    pub id: u64,
    pub bet: f64,
}

/// Where the table is in the wager lifecycle
#[derive(Debug, Clone)]
pub enum WagerPhase {
    /// No funds moved; ready for a drop
    Idle,
    /// Bet debited; ball falling
    Committed { wager: Wager, run: DropRun },
    /// Payout settled (or queued for retry); showing the result
    Resolved {
        wager: Wager,
        outcome: DropOutcome,
        settle_ticks: u32,
    },
}

impl WagerPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, WagerPhase::Idle)
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, WagerPhase::Committed { .. })
    }
}

/// Notifications for the UI, drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    Committed { wager_id: u64, bet: f64, balance: f64 },
    PegHit { peg: usize },
    WallHit,
    Landed { wager_id: u64, outcome: DropOutcome },
    Settled { wager_id: u64, payout: f64, balance: f64 },
    CreditFailed { wager_id: u64, payout: f64 },
    Idle,
}

/// A payout the ledger has not yet accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsettledPayout {
    pub wager_id: u64,
    pub bet: f64,
    pub multiplier: f64,
    pub payout: f64,
    pub last_error: String,
}

/// Result of a completed play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub wager_id: u64,
    pub bet: f64,
    pub outcome: DropOutcome,
    pub payout: f64,
    pub balance: f64,
}

/// A Plinko table bound to one player's ledger
pub struct PlinkoTable<L, R = Pcg32> {
    board: Board,
    physics: PhysicsConfig,
    config: TableConfig,
    ledger: L,
    rng: R,
    clock: FixedClock,
    phase: WagerPhase,
    balance: Option<f64>,
    history: DropHistory,
    unsettled: Vec<UnsettledPayout>,
    events: Vec<TableEvent>,
    last_settlement: Option<Settlement>,
    next_wager_id: u64,
}

impl<L: Ledger> PlinkoTable<L, Pcg32> {
    /// Table with a reproducible RNG stream
    pub fn new(config: PlinkoConfig, ledger: L, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, ledger, Pcg32::seed_from_u64(seed))
    }

    /// Table seeded from OS entropy
    pub fn from_entropy(config: PlinkoConfig, ledger: L) -> Result<Self, ConfigError> {
        Self::with_rng(config, ledger, Pcg32::from_rng(&mut rand::rng()))
    }
}

impl<L: Ledger, R: Rng> PlinkoTable<L, R> {
    pub fn with_rng(config: PlinkoConfig, ledger: L, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::from_config(&config.board)?;
        let history = DropHistory::new(board.slots.len());
        let balance = ledger.balance().ok();
        Ok(Self {
            clock: FixedClock::new(config.physics.dt, config.table.max_substeps),
            board,
            physics: config.physics,
            config: config.table,
            ledger,
            rng,
            phase: WagerPhase::Idle,
            balance,
            history,
            unsettled: Vec::new(),
            events: Vec::new(),
            last_settlement: None,
            next_wager_id: 1,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> &WagerPhase {
        &self.phase
    }

    /// True while a drop request would be rejected
    pub fn is_busy(&self) -> bool {
        !self.phase.is_idle()
    }

    /// Last balance reported by the ledger
    pub fn balance(&self) -> Option<f64> {
        self.balance
    }

    pub fn history(&self) -> &DropHistory {
        &self.history
    }

    pub fn unsettled(&self) -> &[UnsettledPayout] {
        &self.unsettled
    }

    pub fn last_settlement(&self) -> Option<Settlement> {
        self.last_settlement
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// The falling ball, for rendering
    pub fn ball(&self) -> Option<&Ball> {
        match &self.phase {
            WagerPhase::Committed { run, .. } => Some(&run.ball),
            _ => None,
        }
    }

    pub fn drain_events(&mut self) -> Vec<TableEvent> {
        std::mem::take(&mut self.events)
    }

    /// Re-read the balance from the ledger
    pub fn refresh_balance(&mut self) -> Result<f64, WagerError> {
        let balance = self
            .ledger
            .balance()
            .map_err(WagerError::BalanceUnavailable)?;
        self.balance = Some(balance);
        Ok(balance)
    }

    /// Place a bet and spawn a ball
    ///
    /// The debit completes before the first physics step. Returns the wager id.
    pub fn drop_ball(&mut self, bet: f64) -> Result<u64, WagerError> {
        if self.is_busy() {
            log::warn!("Drop rejected: a wager is already in flight");
            return Err(WagerError::Busy);
        }
        if self.ledger.session().is_none() {
            return Err(WagerError::NotAuthenticated);
        }
        if !bet.is_finite() || bet <= 0.0 {
            return Err(WagerError::InvalidWager {
                bet,
                balance: self.balance.unwrap_or(0.0),
            });
        }
        let balance = self.refresh_balance()?;
        if bet > balance {
            return Err(WagerError::InvalidWager { bet, balance });
        }

        let wager = Wager {
            id: self.next_wager_id,
            bet,
        };
        let metadata = json!({
            "action": "bet",
            "wager_id": wager.id,
            "bet": bet,
        });
        let balance = self
            .ledger
            .adjust_balance(-bet, GameCategory::Plinko, metadata)
            .map_err(|err| {
                log::warn!("Bet debit of {} failed: {}", bet, err);
                WagerError::DebitFailed(err)
            })?;

        self.next_wager_id += 1;
        self.balance = Some(balance);
        self.clock.reset();
        self.phase = WagerPhase::Committed {
            wager,
            run: DropRun::new(&self.board),
        };
        self.events.push(TableEvent::Committed {
            wager_id: wager.id,
            bet,
            balance,
        });
        log::info!("Wager {} committed: bet {} (balance {})", wager.id, bet, balance);
        Ok(wager.id)
    }

    /// Advance the table by one fixed simulation step
    ///
    /// Returns `CreditFailed` on the tick where the payout could not be
    /// credited; the table still moves on to `Resolved`.
    pub fn tick(&mut self) -> Result<(), WagerError> {
        match &mut self.phase {
            WagerPhase::Idle => Ok(()),
            WagerPhase::Committed { wager, run } => {
                let wager = *wager;
                match run.tick(&self.board, &self.physics, &mut self.rng) {
                    DropProgress::Falling(StepEvent::PegHit { peg, .. }) => {
                        self.events.push(TableEvent::PegHit { peg });
                        Ok(())
                    }
                    DropProgress::Falling(StepEvent::WallHit) => {
                        self.events.push(TableEvent::WallHit);
                        Ok(())
                    }
                    DropProgress::Falling(_) => Ok(()),
                    DropProgress::Finished(outcome) => self.settle(wager, outcome),
                }
            }
            WagerPhase::Resolved { settle_ticks, .. } => {
                *settle_ticks = settle_ticks.saturating_sub(1);
                if *settle_ticks == 0 {
                    self.phase = WagerPhase::Idle;
                    self.events.push(TableEvent::Idle);
                }
                Ok(())
            }
        }
    }

    /// Advance by however many fixed steps a frame of `frame_dt` seconds covers
    pub fn update(&mut self, frame_dt: f32) -> Result<(), WagerError> {
        let ticks = self.clock.ticks_for_frame(frame_dt);
        self.advance(ticks)
    }

    /// Drive the table from any scheduler
    pub fn update_with<S: Scheduler>(
        &mut self,
        scheduler: &mut S,
        frame_dt: f32,
    ) -> Result<(), WagerError> {
        let ticks = scheduler.ticks_for_frame(frame_dt);
        self.advance(ticks)
    }

    fn advance(&mut self, ticks: u32) -> Result<(), WagerError> {
        let mut result = Ok(());
        for _ in 0..ticks {
            if let Err(err) = self.tick() {
                result = Err(err);
            }
        }
        result
    }

    /// Tick until the table is idle again
    pub fn run_until_idle(&mut self) -> Result<(), WagerError> {
        let mut result = Ok(());
        while self.is_busy() {
            if let Err(err) = self.tick() {
                result = Err(err);
            }
        }
        result
    }

    /// Drop, simulate and settle in one call
    pub fn play(&mut self, bet: f64) -> Result<Settlement, WagerError> {
        let wager_id = self.drop_ball(bet)?;
        self.run_until_idle()?;
        self.last_settlement
            .filter(|s| s.wager_id == wager_id)
            .ok_or(WagerError::Busy)
    }

    /// Credit the payout for a landed ball and move to `Resolved`
    fn settle(&mut self, wager: Wager, outcome: DropOutcome) -> Result<(), WagerError> {
        self.events.push(TableEvent::Landed {
            wager_id: wager.id,
            outcome,
        });
        if outcome.timed_out {
            log::warn!("Wager {} resolved from last position after timeout", wager.id);
        }

        let multiplier = outcome.slot.multiplier;
        let payout = wager.bet * multiplier;
        let credit = if payout > 0.0 {
            let metadata = json!({
                "action": "win",
                "wager_id": wager.id,
                "bet": wager.bet,
                "multiplier": multiplier,
                "slot": outcome.slot.slot_index,
            });
            self.ledger
                .adjust_balance(payout, GameCategory::Plinko, metadata)
        } else {
            // Nothing to credit; the debit already produced the final balance
            Ok(self.balance.unwrap_or_default())
        };

        self.phase = WagerPhase::Resolved {
            wager,
            outcome,
            settle_ticks: self.config.settle_ticks.max(1),
        };

        match credit {
            Ok(balance) => {
                self.balance = Some(balance);
                self.record(wager, outcome, payout, true);
                self.last_settlement = Some(Settlement {
                    wager_id: wager.id,
                    bet: wager.bet,
                    outcome,
                    payout,
                    balance,
                });
                self.events.push(TableEvent::Settled {
                    wager_id: wager.id,
                    payout,
                    balance,
                });
                log::info!(
                    "Wager {} settled: {}x pays {} (balance {})",
                    wager.id,
                    multiplier,
                    payout,
                    balance
                );
                Ok(())
            }
            Err(source) => Err(self.queue_unsettled(wager, multiplier, payout, source)),
        }
    }

    fn queue_unsettled(
        &mut self,
        wager: Wager,
        multiplier: f64,
        payout: f64,
        source: LedgerError,
    ) -> WagerError {
        log::error!(
            "Wager {}: bet {} was charged but payout {} failed: {}",
            wager.id,
            wager.bet,
            payout,
            source
        );
        self.unsettled.push(UnsettledPayout {
            wager_id: wager.id,
            bet: wager.bet,
            multiplier,
            payout,
            last_error: source.to_string(),
        });
        if let WagerPhase::Resolved { outcome, .. } = &self.phase {
            let outcome = *outcome;
            self.record(wager, outcome, payout, false);
        }
        self.events.push(TableEvent::CreditFailed {
            wager_id: wager.id,
            payout,
        });
        WagerError::CreditFailed {
            wager_id: wager.id,
            payout,
            source,
        }
    }

    fn record(&mut self, wager: Wager, outcome: DropOutcome, payout: f64, credited: bool) {
        self.history.record(DropRecord {
            wager_id: wager.id,
            bet: wager.bet,
            slot_index: outcome.slot.slot_index,
            multiplier: outcome.slot.multiplier,
            payout,
            credited,
        });
    }

    /// Retry queued payouts oldest first, stopping at the first failure
    ///
    /// An entry the ledger rejects as an invalid amount can never succeed, so
    /// it is dropped from the queue instead of blocking the ones behind it.
    /// Returns how many were credited.
    pub fn retry_unsettled(&mut self) -> Result<usize, WagerError> {
        let mut credited = 0;
        while let Some(pending) = self.unsettled.first().cloned() {
            let metadata = json!({
                "action": "win",
                "wager_id": pending.wager_id,
                "bet": pending.bet,
                "multiplier": pending.multiplier,
                "retry": true,
            });
            match self
                .ledger
                .adjust_balance(pending.payout, GameCategory::Plinko, metadata)
            {
                Ok(balance) => {
                    self.unsettled.remove(0);
                    self.balance = Some(balance);
                    self.history.mark_credited(pending.wager_id, pending.payout);
                    self.events.push(TableEvent::Settled {
                        wager_id: pending.wager_id,
                        payout: pending.payout,
                        balance,
                    });
                    log::info!("Wager {}: late payout {} credited", pending.wager_id, pending.payout);
                    credited += 1;
                }
                Err(LedgerError::InvalidAmount(amount)) => {
                    log::error!(
                        "Wager {}: dropping unsettled payout, ledger rejects amount {}",
                        pending.wager_id,
                        amount
                    );
                    self.unsettled.remove(0);
                }
                Err(source) => {
                    self.unsettled[0].last_error = source.to_string();
                    return Err(WagerError::CreditFailed {
                        wager_id: pending.wager_id,
                        payout: pending.payout,
                        source,
                    });
                }
            }
        }
        Ok(credited)
    }
}
