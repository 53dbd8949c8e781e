use chrono::{Days, NaiveDate, Utc};
use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    DaySummary, EngineError, ResultEngine, Transaction,
    commands::{TransactionDraft, TransactionPatch},
    reconcile::{self, Reconciliation},
};

use super::{Engine, store, with_tx};

impl Engine {
    /// Records a new expense for `owner_id`.
    pub async fn create_transaction(
        &self,
        owner_id: &str,
        draft: TransactionDraft,
    ) -> ResultEngine<Reconciliation> {
        let _guard = self.locks.acquire(owner_id).await;
        with_tx!(self, |db_tx| {
            let aggregate = store::load_aggregate(&db_tx, owner_id).await?;
            let now = Utc::now();
            let reconciliation = reconcile::apply_create(&aggregate, &draft, &self.policy, now)?;
            store::persist(&db_tx, &reconciliation, now).await?;
            Ok(reconciliation)
        })
    }

    /// Replaces an entry of `owner_id`. Fields missing from `patch` keep
    /// their old value.
    pub async fn update_transaction(
        &self,
        owner_id: &str,
        id: Uuid,
        patch: TransactionPatch,
    ) -> ResultEngine<Reconciliation> {
        let _guard = self.locks.acquire(owner_id).await;
        with_tx!(self, |db_tx| {
            let old = store::owned_entry(&db_tx, owner_id, id).await?;
            let aggregate = store::load_aggregate(&db_tx, owner_id).await?;
            let reconciliation = reconcile::apply_update(&aggregate, &old, &patch, &self.policy)?;
            store::persist(&db_tx, &reconciliation, Utc::now()).await?;
            Ok(reconciliation)
        })
    }

    pub async fn delete_transaction(
        &self,
        owner_id: &str,
        id: Uuid,
    ) -> ResultEngine<Reconciliation> {
        let _guard = self.locks.acquire(owner_id).await;
        with_tx!(self, |db_tx| {
            let entry = store::owned_entry(&db_tx, owner_id, id).await?;
            let aggregate = store::load_aggregate(&db_tx, owner_id).await?;
            let reconciliation = reconcile::apply_delete(&aggregate, &entry)?;
            store::persist(&db_tx, &reconciliation, Utc::now()).await?;
            Ok(reconciliation)
        })
    }

    /// Returns one entry of `owner_id`.
    pub async fn transaction(&self, owner_id: &str, id: Uuid) -> ResultEngine<Transaction> {
        store::owned_entry(&self.database, owner_id, id).await
    }

    /// All entries of `owner_id`, newest first.
    pub async fn list_transactions(&self, owner_id: &str) -> ResultEngine<Vec<Transaction>> {
        store::list_entries(&self.database, owner_id).await
    }

    /// Entries recorded on `day` and their total.
    pub async fn today_summary(&self, owner_id: &str, day: NaiveDate) -> ResultEngine<DaySummary> {
        let next_day = day
            .checked_add_days(Days::new(1))
            .ok_or_else(|| EngineError::InvalidAmount(format!("date out of range: {day}")))?;
        let transactions =
            store::list_entries_between(&self.database, owner_id, day, next_day).await?;
        let total_minor = transactions.iter().map(|tx| tx.amount_minor).sum();
        Ok(DaySummary {
            day,
            transactions,
            total_minor,
        })
    }
}
