//! Reconciliation of ledger mutations against the budget aggregate.
//!
//! Every function here is pure over its inputs: it borrows the current
//! aggregate, works on a private copy and hands back the final aggregate
//! together with the ledger effect to persist. Intermediate states (for
//! example the restored aggregate of an update) never leave the function, and
//! on error the caller's aggregate is untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BudgetAggregate, CategoryKey, CategoryRef, EngineError, Money, ResultEngine, Transaction,
    alert::{self, CriticalAlert},
    commands::{InitializeBudgetCmd, TransactionDraft, TransactionPatch},
};

/// What to do with a category name that is not in the table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Record the entry and charge the balance only.
    #[default]
    PassThrough,
    Reject,
}

/// How budget (re)initialization computes the balance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitializeMode {
    /// `current_balance = total_budget`, ledger history is ignored.
    #[default]
    HardReset,
    /// `current_balance = total_budget - total spent`.
    Rederive,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilePolicy {
    pub unknown_category: UnknownCategoryPolicy,
    /// Also refuse creates that would overdraw the balance.
    pub enforce_non_negative_balance: bool,
    pub initialize_mode: InitializeMode,
}

/// Non-fatal findings of a reconciliation step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconcileWarning {
    /// The entry only affected the balance.
    UnknownCategory { category: String },
    /// A restore would have pushed `spent` below zero; `excess` was dropped.
    SpentClamped { category: CategoryKey, excess: i64 },
    /// An allocation named a category outside the table and was ignored.
    UnknownAllocation { category: String },
}

impl fmt::Display for ReconcileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCategory { category } => {
                write!(f, "category \"{category}\" is not tracked, only the balance changed")
            }
            Self::SpentClamped { category, excess } => {
                write!(f, "spent of {category} clamped at zero ({excess} dropped)")
            }
            Self::UnknownAllocation { category } => {
                write!(f, "allocation for unknown category \"{category}\" ignored")
            }
        }
    }
}

/// Ledger change that must be written together with the new aggregate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEffect {
    Insert(Transaction),
    Replace(Transaction),
    Remove(Uuid),
    Unchanged,
}

impl LedgerEffect {
    /// The entry written by this effect, if any.
    pub fn entry(&self) -> Option<&Transaction> {
        match self {
            Self::Insert(tx) | Self::Replace(tx) => Some(tx),
            Self::Remove(_) | Self::Unchanged => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    pub aggregate: BudgetAggregate,
    pub effect: LedgerEffect,
    pub alert: Option<CriticalAlert>,
    pub warnings: Vec<ReconcileWarning>,
}

impl Reconciliation {
    fn new(aggregate: BudgetAggregate, effect: LedgerEffect, warnings: Vec<ReconcileWarning>) -> Self {
        let alert = alert::critical_alert(&aggregate);
        if alert.is_some() {
            tracing::warn!(
                owner = %aggregate.owner_id,
                balance = aggregate.current_balance,
                "balance is critical"
            );
        }
        Self {
            aggregate,
            effect,
            alert,
            warnings,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.alert.is_some()
    }
}

/// Records a new expense.
///
/// The balance always goes down by the amount; the matching category's
/// `spent` goes up when the category is part of the table.
pub fn apply_create(
    aggregate: &BudgetAggregate,
    draft: &TransactionDraft,
    policy: &ReconcilePolicy,
    now: DateTime<Utc>,
) -> ResultEngine<Reconciliation> {
    let amount_minor = match draft.amount_minor {
        Some(amount) => validate_amount(amount)?,
        None => return Err(EngineError::MissingField("amount".to_string())),
    };
    let category = match non_blank(draft.category.as_deref()) {
        Some(raw) => resolve_category(raw, policy)?,
        None => return Err(EngineError::MissingField("category".to_string())),
    };
    let description = non_blank(draft.description.as_deref())
        .ok_or_else(|| EngineError::MissingField("description".to_string()))?
        .to_string();
    let payment_method = draft
        .payment_method
        .ok_or_else(|| EngineError::MissingField("payment_method".to_string()))?;

    if policy.enforce_non_negative_balance && amount_minor > aggregate.current_balance {
        return Err(EngineError::InsufficientFunds(format!(
            "amount {amount_minor} exceeds balance {}",
            aggregate.current_balance
        )));
    }

    let mut next = aggregate.clone();
    let mut warnings = Vec::new();
    charge(&mut next, &category, amount_minor, &mut warnings)?;

    let entry = Transaction {
        id: Uuid::new_v4(),
        owner_id: aggregate.owner_id.clone(),
        amount_minor,
        category,
        description,
        payment_method,
        occurred_on: draft.occurred_on.unwrap_or_else(|| now.date_naive()),
        created_at: now,
    };
    tracing::debug!(
        owner = %entry.owner_id,
        amount = amount_minor,
        category = %entry.category,
        balance = next.current_balance,
        "create reconciled"
    );
    Ok(Reconciliation::new(next, LedgerEffect::Insert(entry), warnings))
}

/// Replaces `old` with `old` patched by `patch`.
///
/// The old effect is restored and the new one applied on a private copy in
/// one step. Fails with [`EngineError::InsufficientFunds`] when the new amount
/// exceeds the restored balance.
pub fn apply_update(
    aggregate: &BudgetAggregate,
    old: &Transaction,
    patch: &TransactionPatch,
    policy: &ReconcilePolicy,
) -> ResultEngine<Reconciliation> {
    let amount_minor = match patch.amount_minor {
        Some(amount) => validate_amount(amount)?,
        None => old.amount_minor,
    };
    let category = match non_blank(patch.category.as_deref()) {
        Some(raw) if raw != old.category.as_str() => resolve_category(raw, policy)?,
        _ => old.category.clone(),
    };
    let description = non_blank(patch.description.as_deref())
        .map(ToString::to_string)
        .unwrap_or_else(|| old.description.clone());

    let mut next = aggregate.clone();
    let mut warnings = Vec::new();
    restore(&mut next, old, &mut warnings)?;

    if amount_minor > next.current_balance {
        return Err(EngineError::InsufficientFunds(format!(
            "amount {amount_minor} exceeds available balance {}",
            next.current_balance
        )));
    }
    charge(&mut next, &category, amount_minor, &mut warnings)?;

    let entry = Transaction {
        id: old.id,
        owner_id: old.owner_id.clone(),
        amount_minor,
        category,
        description,
        payment_method: patch.payment_method.unwrap_or(old.payment_method),
        occurred_on: patch.occurred_on.unwrap_or(old.occurred_on),
        created_at: old.created_at,
    };
    tracing::debug!(
        owner = %entry.owner_id,
        id = %entry.id,
        old_amount = old.amount_minor,
        amount = amount_minor,
        balance = next.current_balance,
        "update reconciled"
    );
    Ok(Reconciliation::new(next, LedgerEffect::Replace(entry), warnings))
}

/// Gives the effect of `entry` back to the aggregate and removes the entry.
pub fn apply_delete(
    aggregate: &BudgetAggregate,
    entry: &Transaction,
) -> ResultEngine<Reconciliation> {
    let mut next = aggregate.clone();
    let mut warnings = Vec::new();
    restore(&mut next, entry, &mut warnings)?;
    tracing::debug!(
        owner = %entry.owner_id,
        id = %entry.id,
        balance = next.current_balance,
        "delete reconciled"
    );
    Ok(Reconciliation::new(
        next,
        LedgerEffect::Remove(entry.id),
        warnings,
    ))
}

/// Sets the total and the listed allocations. `spent` is never touched.
pub fn initialize_budget(
    aggregate: &BudgetAggregate,
    cmd: &InitializeBudgetCmd,
    policy: &ReconcilePolicy,
) -> ResultEngine<Reconciliation> {
    if cmd.total_budget < 0 {
        return Err(EngineError::InvalidAmount(
            "total_budget must be >= 0".to_string(),
        ));
    }

    let mut next = aggregate.clone();
    let mut warnings = Vec::new();
    for allocation in &cmd.allocations {
        if allocation.amount_minor < 0 {
            return Err(EngineError::InvalidAmount(format!(
                "allocation for {} must be >= 0",
                allocation.category
            )));
        }
        match CategoryKey::from_name(&allocation.category) {
            Some(key) => next.categories.set_allocation(key, allocation.amount_minor),
            None if policy.unknown_category == UnknownCategoryPolicy::Reject => {
                return Err(EngineError::UnknownCategory(allocation.category.clone()));
            }
            None => {
                tracing::warn!(
                    owner = %aggregate.owner_id,
                    category = %allocation.category,
                    "ignoring allocation for unknown category"
                );
                warnings.push(ReconcileWarning::UnknownAllocation {
                    category: allocation.category.clone(),
                });
            }
        }
    }

    next.total_budget = cmd.total_budget;
    next.current_balance = match policy.initialize_mode {
        InitializeMode::HardReset => cmd.total_budget,
        InitializeMode::Rederive => Money::new(cmd.total_budget)
            .checked_sub(Money::new(next.total_spent()))
            .ok_or_else(EngineError::amount_out_of_range)?
            .minor(),
    };
    tracing::debug!(
        owner = %next.owner_id,
        total = next.total_budget,
        balance = next.current_balance,
        mode = ?policy.initialize_mode,
        "budget initialized"
    );
    Ok(Reconciliation::new(next, LedgerEffect::Unchanged, warnings))
}

/// Rebuilds `spent` and the balance from the full ledger of the owner.
///
/// Allocations and the total are kept. Entries under unknown categories are
/// charged to the balance only, the same way [`apply_create`] does.
pub fn derive_from_ledger(
    aggregate: &BudgetAggregate,
    ledger: &[Transaction],
) -> ResultEngine<Reconciliation> {
    let mut next = aggregate.clone();
    for key in CategoryKey::ALL {
        next.categories.set_spent(key, 0);
    }
    next.current_balance = next.total_budget;

    let mut warnings = Vec::new();
    for entry in ledger.iter().filter(|e| e.owner_id == aggregate.owner_id) {
        charge(&mut next, &entry.category, entry.amount_minor, &mut warnings)?;
    }
    tracing::debug!(
        owner = %next.owner_id,
        entries = ledger.len(),
        balance = next.current_balance,
        "aggregate derived from ledger"
    );
    Ok(Reconciliation::new(next, LedgerEffect::Unchanged, warnings))
}

fn validate_amount(amount_minor: i64) -> ResultEngine<i64> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(
            "amount must be > 0".to_string(),
        ));
    }
    Ok(amount_minor)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn resolve_category(raw: &str, policy: &ReconcilePolicy) -> ResultEngine<CategoryRef> {
    let category = CategoryRef::parse(raw);
    if category.key().is_none() && policy.unknown_category == UnknownCategoryPolicy::Reject {
        return Err(EngineError::UnknownCategory(raw.to_string()));
    }
    Ok(category)
}

fn charge(
    aggregate: &mut BudgetAggregate,
    category: &CategoryRef,
    amount_minor: i64,
    warnings: &mut Vec<ReconcileWarning>,
) -> ResultEngine<()> {
    let balance = Money::new(aggregate.current_balance)
        .checked_sub(Money::new(amount_minor))
        .ok_or_else(EngineError::amount_out_of_range)?;
    match category.key() {
        Some(key) => aggregate.categories.record_spend(key, amount_minor)?,
        None => {
            tracing::warn!(
                owner = %aggregate.owner_id,
                category = %category,
                "unknown category, charging balance only"
            );
            warnings.push(ReconcileWarning::UnknownCategory {
                category: category.as_str().to_string(),
            });
        }
    }
    aggregate.current_balance = balance.minor();
    Ok(())
}

fn restore(
    aggregate: &mut BudgetAggregate,
    entry: &Transaction,
    warnings: &mut Vec<ReconcileWarning>,
) -> ResultEngine<()> {
    let balance = Money::new(aggregate.current_balance)
        .checked_add(Money::new(entry.amount_minor))
        .ok_or_else(EngineError::amount_out_of_range)?;
    if let Some(key) = entry.category.key() {
        if let Some(excess) = aggregate.categories.restore_spend(key, entry.amount_minor)? {
            tracing::warn!(
                owner = %aggregate.owner_id,
                category = %key,
                excess,
                "restore clamped spent at zero"
            );
            warnings.push(ReconcileWarning::SpentClamped { category: key, excess });
        }
    }
    aggregate.current_balance = balance.minor();
    Ok(())
}
