//! Deterministic simulation module
//!
//! All drop physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Injected seeded RNG only
//! - Stable peg iteration order (generation order)
//! - No ledger or rendering dependencies

pub mod board;
pub mod clock;
pub mod drop;
pub mod physics;
pub mod slots;

pub use board::{Board, generate_board};
pub use clock::{FixedClock, Scheduler, Unthrottled};
pub use drop::{DropOutcome, DropProgress, DropRun, simulate_drop};
pub use physics::{Ball, StepEvent, contain_in_walls, peg_bounce, step};
pub use slots::{SlotHit, resolve_slot};
