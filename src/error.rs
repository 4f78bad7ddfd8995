//! Error types for the simulator, ledger and wager lifecycle

use thiserror::Error;

/// Board construction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    #[error("Board needs at least one row")]
    NoRows,

    #[error("Top row of {pegs} pegs cannot hold {rows} shrinking rows")]
    TooManyRows { rows: usize, pegs: usize },

    #[error("Spacing must be positive and finite, got {0}")]
    InvalidSpacing(f32),

    #[error("Slot count must be odd, got {0}")]
    EvenSlotCount(usize),

    #[error("Multipliers must be symmetric around the center slot")]
    AsymmetricSlots,

    #[error("Multipliers must not increase toward the edges (slot {index})")]
    SlotsNotPeaked { index: usize },

    #[error("Multiplier at slot {index} is invalid: {value}")]
    InvalidMultiplier { index: usize, value: f64 },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid board: {0}")]
    Board(#[from] BoardError),

    #[error("Invalid physics parameter {name}: {value}")]
    Physics { name: &'static str, value: f32 },
}

/// Errors reported by an account ledger
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Invalid game type: {0}")]
    InvalidCategory(String),

    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: f64, requested: f64 },

    #[error("Ledger backend error: {0}")]
    Backend(String),
}

/// Errors from a drop request or its settlement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WagerError {
    /// Bet was non-positive, non-finite or above the current balance
    #[error("Invalid wager of {bet} (balance {balance})")]
    InvalidWager { bet: f64, balance: f64 },

    /// A wager is already in flight
    #[error("A drop is already in progress")]
    Busy,

    #[error("No active session")]
    NotAuthenticated,

    #[error("Could not read balance: {0}")]
    BalanceUnavailable(LedgerError),

    /// Ledger rejected the bet debit; nothing was charged
    #[error("Bet could not be placed: {0}")]
    DebitFailed(LedgerError),

    /// Bet was charged but the payout credit failed
    #[error("Payout of {payout} for wager {wager_id} was not credited: {source}")]
    CreditFailed {
        wager_id: u64,
        payout: f64,
        source: LedgerError,
    },
}

impl WagerError {
    /// True when the player has paid but not been paid out
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, WagerError::CreditFailed { .. })
    }
}
