//! Command structs for engine operations.
//!
//! Request fields stay optional here: reconciliation is what decides whether
//! a missing field is an error (create) or means "keep the old value"
//! (update).

use chrono::NaiveDate;

use crate::PaymentMethod;

/// Fields of a new ledger entry, as received from a caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionDraft {
    pub amount_minor: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    /// Defaults to the current day when absent.
    pub occurred_on: Option<NaiveDate>,
}

impl TransactionDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn amount(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = Some(payment_method);
        self
    }

    #[must_use]
    pub fn occurred_on(mut self, occurred_on: NaiveDate) -> Self {
        self.occurred_on = Some(occurred_on);
        self
    }
}

/// Changes to an existing ledger entry. `None` (or blank text) keeps the old
/// value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub amount_minor: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub occurred_on: Option<NaiveDate>,
}

impl TransactionPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn amount(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = Some(payment_method);
        self
    }

    #[must_use]
    pub fn occurred_on(mut self, occurred_on: NaiveDate) -> Self {
        self.occurred_on = Some(occurred_on);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub category: String,
    pub amount_minor: i64,
}

/// (Re)initialize a budget: new total and per-category allocations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitializeBudgetCmd {
    pub total_budget: i64,
    pub allocations: Vec<Allocation>,
}

impl InitializeBudgetCmd {
    #[must_use]
    pub fn new(total_budget: i64) -> Self {
        Self {
            total_budget,
            allocations: Vec::new(),
        }
    }

    #[must_use]
    pub fn allocate(mut self, category: impl Into<String>, amount_minor: i64) -> Self {
        self.allocations.push(Allocation {
            category: category.into(),
            amount_minor,
        });
        self
    }
}
