use chrono::Utc;
use sea_orm::TransactionTrait;

use crate::{
    BudgetAggregate, ResultEngine,
    commands::InitializeBudgetCmd,
    reconcile::{self, Reconciliation},
};

use super::{Engine, store, with_tx};

impl Engine {
    /// Returns the budget of `owner_id`, creating an empty one on first access.
    pub async fn budget(&self, owner_id: &str) -> ResultEngine<BudgetAggregate> {
        let _guard = self.locks.acquire(owner_id).await;
        with_tx!(self, |db_tx| {
            store::load_aggregate(&db_tx, owner_id).await
        })
    }

    /// Sets the total budget and category allocations of `owner_id`.
    pub async fn initialize_budget(
        &self,
        owner_id: &str,
        cmd: InitializeBudgetCmd,
    ) -> ResultEngine<Reconciliation> {
        let _guard = self.locks.acquire(owner_id).await;
        with_tx!(self, |db_tx| {
            let aggregate = store::load_aggregate(&db_tx, owner_id).await?;
            let reconciliation = reconcile::initialize_budget(&aggregate, &cmd, &self.policy)?;
            store::persist(&db_tx, &reconciliation, Utc::now()).await?;
            tracing::info!(
                owner = owner_id,
                total = cmd.total_budget,
                allocations = cmd.allocations.len(),
                "budget initialized"
            );
            Ok(reconciliation)
        })
    }

    /// Rebuilds every category `spent` and the balance from the ledger.
    pub async fn recompute_budget(&self, owner_id: &str) -> ResultEngine<Reconciliation> {
        let _guard = self.locks.acquire(owner_id).await;
        with_tx!(self, |db_tx| {
            let aggregate = store::load_aggregate(&db_tx, owner_id).await?;
            let ledger = store::list_entries(&db_tx, owner_id).await?;
            let reconciliation = reconcile::derive_from_ledger(&aggregate, &ledger)?;
            store::persist(&db_tx, &reconciliation, Utc::now()).await?;
            tracing::info!(
                owner = owner_id,
                entries = ledger.len(),
                drift_before = aggregate.ledger_drift(),
                balance_before = aggregate.current_balance,
                balance = reconciliation.aggregate.current_balance,
                "budget recomputed"
            );
            Ok(reconciliation)
        })
    }
}
