//! Low-balance monitor. Evaluated after every mutation, never stored.

use serde::{Deserialize, Serialize};

use crate::BudgetAggregate;

/// Balance, in minor units, at or below which the budget is critical.
pub const CRITICAL_THRESHOLD: i64 = 50_000;

pub const CRITICAL_MESSAGE: &str = "Saldo Kritis! Hemat dulu bestie!";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalAlert {
    pub current_balance: i64,
    pub message: String,
}

#[must_use]
pub fn is_critical(aggregate: &BudgetAggregate) -> bool {
    aggregate.current_balance <= CRITICAL_THRESHOLD
}

/// Returns the advisory for `aggregate`, if any.
pub fn critical_alert(aggregate: &BudgetAggregate) -> Option<CriticalAlert> {
    is_critical(aggregate).then(|| CriticalAlert {
        current_balance: aggregate.current_balance,
        message: CRITICAL_MESSAGE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_balance(balance: i64) -> BudgetAggregate {
        let mut aggregate = BudgetAggregate::with_total("alice", 1_000_000);
        aggregate.current_balance = balance;
        aggregate
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(!is_critical(&with_balance(50_001)));
        assert!(is_critical(&with_balance(50_000)));
        assert!(is_critical(&with_balance(0)));
        assert!(is_critical(&with_balance(-1)));
    }

    #[test]
    fn alert_carries_fixed_message() {
        assert_eq!(critical_alert(&with_balance(60_000)), None);
        let alert = critical_alert(&with_balance(10_000)).unwrap();
        assert_eq!(alert.current_balance, 10_000);
        assert_eq!(alert.message, CRITICAL_MESSAGE);
    }
}
