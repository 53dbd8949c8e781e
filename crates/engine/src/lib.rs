//! Budget keeping engine.
//!
//! A [`BudgetAggregate`] holds the running totals of one owner, the ledger
//! holds the [`Transaction`]s they were derived from. [`reconcile`] applies
//! ledger mutations to the aggregate without touching storage, [`Engine`]
//! wraps it with persistence and per-owner serialization.

pub use alert::{CRITICAL_MESSAGE, CRITICAL_THRESHOLD, CriticalAlert, critical_alert, is_critical};
pub use budget::BudgetAggregate;
pub use categories::{CategoryEntry, CategoryGroup, CategoryKey, CategoryRef, CategoryTable};
pub use commands::{Allocation, InitializeBudgetCmd, TransactionDraft, TransactionPatch};
pub use error::EngineError;
pub use money::Money;
pub use ops::{Engine, EngineBuilder};
pub use reconcile::{
    InitializeMode, LedgerEffect, ReconcilePolicy, ReconcileWarning, Reconciliation,
    UnknownCategoryPolicy,
};
pub use transactions::{DaySummary, PaymentMethod, Transaction};

pub mod alert;
mod budget;
mod categories;
pub mod commands;
mod error;
mod locks;
mod money;
mod ops;
pub mod reconcile;
mod transactions;
pub mod users;

pub type ResultEngine<T> = Result<T, EngineError>;
