// ⚖️ Balance Tracker - running balances with per-tier overdraft floors

use crate::banking::accounts::AccountType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// BANKING TIERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BankingTier {
    Premium,
    Gold,
    Standard,
    Basic,
    Student,
    Business,
    Other,
}

impl BankingTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BankingTier::Premium => "Premium Banking",
            BankingTier::Gold => "Gold Banking",
            BankingTier::Standard => "Standard Banking",
            BankingTier::Basic => "Basic Banking",
            BankingTier::Student => "Student Banking",
            BankingTier::Business => "Business Banking",
            BankingTier::Other => "Other",
        }
    }

    /// Lowest balance the tier may reach
    pub fn overdraft_floor(&self) -> f64 {
        match self {
            BankingTier::Premium => -10_000.0,
            BankingTier::Gold => -5_000.0,
            BankingTier::Standard => -2_000.0,
            BankingTier::Basic => -500.0,
            BankingTier::Student => -200.0,
            BankingTier::Business => -20_000.0,
            BankingTier::Other => -1_000.0,
        }
    }

    pub fn for_account_type(account_type: AccountType) -> BankingTier {
        match account_type {
            AccountType::Platinum | AccountType::Premium => BankingTier::Premium,
            AccountType::Gold => BankingTier::Gold,
            AccountType::Current | AccountType::Cheque | AccountType::Aspire | AccountType::Joint => {
                BankingTier::Standard
            }
            AccountType::Savings | AccountType::Easy | AccountType::Islamic => BankingTier::Basic,
            AccountType::Business => BankingTier::Business,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Debit => "debit",
            Direction::Credit => "credit",
        }
    }

    /// Accepts both "Debit" and "debit"
    pub fn parse(s: &str) -> Option<Direction> {
        match s.trim().to_lowercase().as_str() {
            "debit" => Some(Direction::Debit),
            "credit" => Some(Direction::Credit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct TrackedAccount {
    balance: f64,
    tier: BankingTier,
}

// ============================================================================
// TRACKER
// ============================================================================

/// Single-pass running balance per account for one simulated year
#[derive(Debug, Default)]
pub struct BalanceTracker {
    accounts: HashMap<String, TrackedAccount>,
}

impl BalanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self, account_id: &str, tier: BankingTier, opening_balance: f64) {
        self.accounts.insert(
            account_id.to_string(),
            TrackedAccount {
                balance: opening_balance,
                tier,
            },
        );
    }

    pub fn is_tracked(&self, account_id: &str) -> bool {
        self.accounts.contains_key(account_id)
    }

    /// True when `amount` can be debited without crossing the floor
    pub fn can_transact(&self, account_id: &str, amount: f64) -> bool {
        match self.accounts.get(account_id) {
            Some(acc) => acc.balance - amount >= acc.tier.overdraft_floor(),
            None => {
                tracing::debug!(account_id, "account not tracked");
                false
            }
        }
    }

    /// Applies the movement. A refused debit or unknown account leaves state untouched.
    pub fn process(&mut self, account_id: &str, amount: f64, direction: Direction) -> bool {
        if direction == Direction::Debit && !self.can_transact(account_id, amount) {
            return false;
        }
        let Some(acc) = self.accounts.get_mut(account_id) else {
            tracing::debug!(account_id, "cannot process for unknown account");
            return false;
        };
        match direction {
            Direction::Debit => acc.balance -= amount,
            Direction::Credit => acc.balance += amount,
        }
        true
    }

    /// Unknown accounts report zero
    pub fn balance(&self, account_id: &str) -> f64 {
        self.accounts.get(account_id).map_or(0.0, |a| a.balance)
    }

    /// Largest debit still allowed, keeping `margin` above the floor
    pub fn headroom(&self, account_id: &str, margin: f64) -> f64 {
        self.accounts
            .get(account_id)
            .map_or(0.0, |a| a.balance - a.tier.overdraft_floor() - margin)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tracker() -> BalanceTracker {
        let mut tracker = BalanceTracker::new();
        tracker.initialize("ACC1", BankingTier::Basic, 100.0);
        tracker.initialize("ACC2", BankingTier::Business, 0.0);
        tracker
    }

    #[test]
    fn test_debit_respects_floor() {
        let mut tracker = create_test_tracker();

        assert!(tracker.can_transact("ACC1", 600.0));
        assert!(!tracker.can_transact("ACC1", 600.01));

        assert!(!tracker.process("ACC1", 700.0, Direction::Debit), "breach refused");
        assert_eq!(tracker.balance("ACC1"), 100.0, "refused debit leaves balance");

        assert!(tracker.process("ACC1", 600.0, Direction::Debit));
        assert_eq!(tracker.balance("ACC1"), -500.0);
        println!("✅ Overdraft floor PASSED");
    }

    #[test]
    fn test_credit_and_unknown_account() {
        let mut tracker = create_test_tracker();
        assert!(tracker.process("ACC2", 250.0, Direction::Credit));
        assert_eq!(tracker.balance("ACC2"), 250.0);

        assert!(!tracker.process("NOPE", 10.0, Direction::Credit));
        assert!(!tracker.can_transact("NOPE", 0.0));
        assert_eq!(tracker.balance("NOPE"), 0.0);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_tier_mapping() {
        assert_eq!(BankingTier::for_account_type(AccountType::Platinum), BankingTier::Premium);
        assert_eq!(BankingTier::for_account_type(AccountType::Joint), BankingTier::Standard);
        assert_eq!(BankingTier::for_account_type(AccountType::Islamic), BankingTier::Basic);
        assert_eq!(BankingTier::Business.overdraft_floor(), -20_000.0);
        assert_eq!(BankingTier::Other.overdraft_floor(), -1_000.0);
        assert_eq!(Direction::parse("Debit"), Some(Direction::Debit));
    }
}
