//! Account ledger contract
//!
//! The simulator never touches a balance directly; it asks a [`Ledger`] to
//! record signed adjustments and reports the balance the ledger returns.
//! [`MemoryLedger`] is a self-contained implementation used by the CLI and
//! tests.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::consts::STARTING_BALANCE;
use crate::error::LedgerError;

/// Game a ledger entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameCategory {
    Plinko,
    Mines,
    Sports,
}

impl GameCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameCategory::Plinko => "plinko",
            GameCategory::Mines => "mines",
            GameCategory::Sports => "sports",
        }
    }
}

impl fmt::Display for GameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameCategory {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plinko" => Ok(GameCategory::Plinko),
            "mines" => Ok(GameCategory::Mines),
            "sports" => Ok(GameCategory::Sports),
            _ => Err(LedgerError::InvalidCategory(s.to_string())),
        }
    }
}

/// An authenticated player session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
        }
    }
}

/// Balance store and transaction log for the signed-in player
///
/// Each call is atomic. Negative amounts debit, positive amounts credit.
pub trait Ledger {
    /// The active session, if any
    fn session(&self) -> Option<Session>;

    fn balance(&self) -> Result<f64, LedgerError>;

    /// Record an entry and return the resulting balance
    fn adjust_balance(
        &mut self,
        amount: f64,
        category: GameCategory,
        metadata: Value,
    ) -> Result<f64, LedgerError>;
}

/// One recorded transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: u64,
    pub user_id: String,
    pub amount: f64,
    pub category: GameCategory,
    pub details: Value,
    pub balance_after: f64,
}

/// In-process ledger with per-user balances and an append-only log
#[derive(Debug, Default)]
pub struct MemoryLedger {
    session: Option<Session>,
    balances: HashMap<String, f64>,
    entries: Vec<LedgerEntry>,
    starting_balance: Option<f64>,
    fail_next_debit: Option<LedgerError>,
    fail_next_credit: Option<LedgerError>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with `user_id` already signed in holding `balance`
    pub fn with_player(user_id: &str, balance: f64) -> Self {
        let mut ledger = Self::new();
        ledger.balances.insert(user_id.to_string(), balance);
        ledger.sign_in(Session::new(user_id));
        ledger
    }

    /// Balance given to accounts on first sign-in
    pub fn set_starting_balance(&mut self, balance: f64) {
        self.starting_balance = Some(balance);
    }

    pub fn sign_in(&mut self, session: Session) {
        let opening = self.starting_balance.unwrap_or(STARTING_BALANCE);
        self.balances
            .entry(session.user_id.clone())
            .or_insert(opening);
        log::info!("Signed in as {}", session.user_id);
        self.session = Some(session);
    }

    pub fn sign_out(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!("Signed out {}", session.user_id);
        }
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn entries_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }

    /// Make the next debit fail with `err` (one shot)
    pub fn fail_next_debit(&mut self, err: LedgerError) {
        self.fail_next_debit = Some(err);
    }

    /// Make the next credit fail with `err` (one shot)
    pub fn fail_next_credit(&mut self, err: LedgerError) {
        self.fail_next_credit = Some(err);
    }

    fn user_id(&self) -> Result<&str, LedgerError> {
        self.session
            .as_ref()
            .map(|s| s.user_id.as_str())
            .ok_or(LedgerError::NotAuthenticated)
    }
}

impl Ledger for MemoryLedger {
    fn session(&self) -> Option<Session> {
        self.session.clone()
    }

    fn balance(&self) -> Result<f64, LedgerError> {
        let user = self.user_id()?;
        Ok(self.balances.get(user).copied().unwrap_or(0.0))
    }

    fn adjust_balance(
        &mut self,
        amount: f64,
        category: GameCategory,
        metadata: Value,
    ) -> Result<f64, LedgerError> {
        if !amount.is_finite() || amount == 0.0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let user = self.user_id()?.to_string();

        let injected = if amount < 0.0 {
            self.fail_next_debit.take()
        } else {
            self.fail_next_credit.take()
        };
        if let Some(err) = injected {
            return Err(err);
        }

        let balance = self.balances.get(&user).copied().unwrap_or(0.0);
        let balance_after = balance + amount;
        if balance_after < 0.0 {
            return Err(LedgerError::InsufficientFunds {
                balance,
                requested: -amount,
            });
        }

        let mut details = match metadata {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        details.insert("amount".to_string(), json!(amount));

        let id = self.entries.len() as u64 + 1;
        self.entries.push(LedgerEntry {
            id,
            user_id: user.clone(),
            amount,
            category,
            details: Value::Object(details),
            balance_after,
        });
        self.balances.insert(user, balance_after);
        Ok(balance_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_session() {
        let mut ledger = MemoryLedger::new();
        assert_eq!(ledger.balance(), Err(LedgerError::NotAuthenticated));
        assert_eq!(
            ledger.adjust_balance(-10.0, GameCategory::Plinko, Value::Null),
            Err(LedgerError::NotAuthenticated)
        );
    }

    #[test]
    fn test_new_account_gets_starting_balance() {
        let mut ledger = MemoryLedger::new();
        ledger.sign_in(Session::new("alice"));
        assert_eq!(ledger.balance(), Ok(STARTING_BALANCE));
    }

    #[test]
    fn test_custom_starting_balance_applies_to_new_accounts() {
        let mut ledger = MemoryLedger::with_player("carol", 40.0);
        ledger.set_starting_balance(250.0);
        ledger.sign_in(Session::new("dave"));
        assert_eq!(ledger.balance(), Ok(250.0));
        // Existing accounts keep their balance
        ledger.sign_in(Session::new("carol"));
        assert_eq!(ledger.balance(), Ok(40.0));
    }

    #[test]
    fn test_entries_export_as_json() {
        let mut ledger = MemoryLedger::with_player("erin", 100.0);
        ledger
            .adjust_balance(-10.0, GameCategory::Plinko, json!({ "action": "bet" }))
            .unwrap();
        let exported: Value = serde_json::from_str(&ledger.entries_json().unwrap()).unwrap();
        let entries = exported.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["amount"], json!(-10.0));
        assert_eq!(entries[0]["details"]["action"], json!("bet"));
    }

    #[test]
    fn test_debit_and_credit_are_logged() {
        let mut ledger = MemoryLedger::with_player("bob", 100.0);
        assert_eq!(
            ledger.adjust_balance(-10.0, GameCategory::Plinko, json!({ "action": "bet" })),
            Ok(90.0)
        );
        assert_eq!(
            ledger.adjust_balance(25.0, GameCategory::Plinko, json!({ "action": "win" })),
            Ok(115.0)
        );

        let entries = ledger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].details["action"], "bet");
        assert_eq!(entries[0].details["amount"], -10.0);
        assert_eq!(entries[1].balance_after, 115.0);
        assert_eq!(entries[1].user_id, "bob");
    }

    #[test]
    fn test_rejects_overdraft_and_bad_amounts() {
        let mut ledger = MemoryLedger::with_player("carol", 5.0);
        assert!(matches!(
            ledger.adjust_balance(-10.0, GameCategory::Mines, Value::Null),
            Err(LedgerError::InsufficientFunds { .. })
        ));
        assert_eq!(
            ledger.adjust_balance(0.0, GameCategory::Mines, Value::Null),
            Err(LedgerError::InvalidAmount(0.0))
        );
        assert!(matches!(
            ledger.adjust_balance(f64::NAN, GameCategory::Mines, Value::Null),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert_eq!(ledger.balance(), Ok(5.0));
        assert!(ledger.entries().is_empty());
    }

    #[test]
    fn test_injected_failures_are_one_shot() {
        let mut ledger = MemoryLedger::with_player("dave", 50.0);
        ledger.fail_next_credit(LedgerError::Backend("timeout".into()));
        // Debits are unaffected by a pending credit failure
        assert_eq!(ledger.adjust_balance(-5.0, GameCategory::Plinko, Value::Null), Ok(45.0));
        assert!(ledger.adjust_balance(5.0, GameCategory::Plinko, Value::Null).is_err());
        assert_eq!(ledger.adjust_balance(5.0, GameCategory::Plinko, Value::Null), Ok(50.0));
    }

    #[test]
    fn test_balances_survive_sign_out() {
        let mut ledger = MemoryLedger::with_player("erin", 20.0);
        ledger.adjust_balance(-5.0, GameCategory::Sports, Value::Null).unwrap();
        ledger.sign_out();
        assert!(ledger.session().is_none());
        ledger.sign_in(Session::new("erin"));
        assert_eq!(ledger.balance(), Ok(15.0));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Plinko".parse::<GameCategory>(), Ok(GameCategory::Plinko));
        assert_eq!(" sports ".parse::<GameCategory>(), Ok(GameCategory::Sports));
        assert_eq!(
            "poker".parse::<GameCategory>(),
            Err(LedgerError::InvalidCategory("poker".into()))
        );
        assert_eq!(GameCategory::Mines.to_string(), "mines");
    }
}
