//! Plinko Sim entry point
//!
//! Plays a session against an in-memory ledger, or estimates return to player.
//!
//! ```text
//! plinko-sim [--drops N] [--bet AMOUNT] [--seed SEED] [--config PATH] [--rtp N]
//!            [--starting-balance AMOUNT] [--ledger]
//! ```

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use plinko_sim::{MemoryLedger, PlinkoConfig, PlinkoTable, Session, WagerError, simulate_distribution};

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Parser)]
#[command(name = "plinko-sim", about = "Plinko ball-drop simulator")]
struct Args {
    /// Number of balls to drop in a session
    #[arg(long, default_value_t = 10)]
    drops: u32,

    /// Bet placed on every drop
    #[arg(long, default_value_t = 10.0)]
    bet: f64,

    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON board/physics config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Estimate return to player over N drops instead of playing
    #[arg(long, value_name = "N")]
    rtp: Option<u64>,

    /// Opening balance of the demo account
    #[arg(long)]
    starting_balance: Option<f64>,

    /// Print the ledger's transaction log after the session
    #[arg(long)]
    ledger: bool,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => PlinkoConfig::load(path)?,
        None => PlinkoConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Plinko Sim starting with seed {seed}");

    if let Some(drops) = args.rtp {
        let report = simulate_distribution(&config, seed, drops)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut ledger = MemoryLedger::new();
    if let Some(balance) = args.starting_balance {
        ledger.set_starting_balance(balance);
    }
    ledger.sign_in(Session::new("demo"));
    let mut table = PlinkoTable::new(config, ledger, seed)?;

    for _ in 0..args.drops {
        match table.play(args.bet) {
            Ok(settlement) => log::info!(
                "Slot {} pays {}x -> balance {}",
                settlement.outcome.slot.slot_index,
                settlement.outcome.slot.multiplier,
                settlement.balance
            ),
            Err(WagerError::InvalidWager { balance, .. }) => {
                log::warn!("Balance {balance} too low for a bet of {}, stopping", args.bet);
                break;
            }
            Err(err) if err.is_partial_failure() => log::error!("{err}"),
            Err(err) => return Err(err.into()),
        }
    }

    println!("{}", serde_json::to_string_pretty(table.history())?);
    if args.ledger {
        println!("{}", table.ledger().entries_json()?);
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
