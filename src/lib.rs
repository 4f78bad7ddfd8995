//! Plinko Sim - ball-drop physics and wager settlement
//!
//! Core modules:
//! - `sim`: Deterministic simulation (board lattice, physics stepping, slot resolution)
//! - `table`: Wager lifecycle driving the simulation against a ledger
//! - `ledger`: Account ledger contract and an in-memory implementation
//! - `history`: Recent drop results and running totals
//! - `config`: Data-driven board/physics tuning
//! - `rtp`: Headless return-to-player estimation

pub mod config;
pub mod error;
pub mod history;
pub mod ledger;
pub mod rtp;
pub mod sim;
pub mod table;

pub use config::{BoardConfig, PhysicsConfig, PlinkoConfig, TableConfig};
pub use error::{BoardError, ConfigError, LedgerError, WagerError};
pub use history::DropHistory;
pub use ledger::{GameCategory, Ledger, LedgerEntry, MemoryLedger, Session};
pub use rtp::{DistributionReport, simulate_distribution};
pub use table::{PlinkoTable, Settlement, TableEvent, WagerPhase};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Board lattice
    pub const ROWS: usize = 8;
    pub const PEGS_IN_TOP_ROW: usize = 9;
    pub const HORIZONTAL_SPACING: f32 = 40.0;
    pub const VERTICAL_SPACING: f32 = 50.0;
    /// Y of the first peg row (ball spawns at y = 0)
    pub const TOP_OFFSET: f32 = 40.0;
    pub const SLOT_AREA_HEIGHT: f32 = 50.0;
    pub const PEG_DIAMETER: f32 = 8.0;
    pub const BALL_DIAMETER: f32 = 12.0;

    /// Payout multipliers, left to right
    pub const MULTIPLIERS: [f64; 9] = [0.5, 1.0, 1.5, 2.0, 5.0, 2.0, 1.5, 1.0, 0.5];

    /// Downward acceleration (units/s²)
    pub const GRAVITY: f32 = 900.0;
    /// Per-step velocity damping
    pub const FRICTION: f32 = 0.99;
    /// Energy kept on each peg/wall bounce
    pub const BOUNCE: f32 = 0.75;
    /// Horizontal perturbation range on peg hits, as a fraction of speed
    pub const JITTER: f32 = 0.5;
    /// Step budget for a single drop (100 s at 120 Hz)
    pub const MAX_STEPS: u32 = 12_000;

    /// Ticks the resolved result stays on screen before the table goes idle (1 s)
    pub const SETTLE_TICKS: u32 = 120;
    /// Starting balance for fresh demo accounts
    pub const STARTING_BALANCE: f64 = 1000.0;
}
