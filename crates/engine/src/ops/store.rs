//! Ledger and aggregate persistence.
//!
//! Everything here takes a connection so it can run inside the caller's
//! database transaction.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, prelude::*, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    BudgetAggregate, EngineError, ResultEngine, Transaction, budget, categories,
    reconcile::{LedgerEffect, Reconciliation},
    transactions,
};

pub(super) async fn find_aggregate<C: ConnectionTrait>(
    db: &C,
    owner_id: &str,
) -> ResultEngine<Option<BudgetAggregate>> {
    let Some(model) = budget::Entity::find_by_id(owner_id.to_string())
        .one(db)
        .await?
    else {
        return Ok(None);
    };
    let rows = categories::Entity::find()
        .filter(categories::Column::OwnerId.eq(owner_id.to_string()))
        .all(db)
        .await?;
    BudgetAggregate::try_from((model, rows)).map(Some)
}

/// Loads the aggregate of `owner_id`, creating it with zeros when absent.
pub(super) async fn load_aggregate<C: ConnectionTrait>(
    db: &C,
    owner_id: &str,
) -> ResultEngine<BudgetAggregate> {
    if let Some(aggregate) = find_aggregate(db, owner_id).await? {
        return Ok(aggregate);
    }
    let aggregate = BudgetAggregate::new(owner_id);
    insert_aggregate(db, &aggregate, Utc::now()).await?;
    tracing::debug!(owner = owner_id, "created empty budget");
    Ok(aggregate)
}

pub(super) async fn insert_aggregate<C: ConnectionTrait>(
    db: &C,
    aggregate: &BudgetAggregate,
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    let mut model = budget::ActiveModel::from_aggregate(aggregate, now);
    model.created_at = ActiveValue::Set(now);
    model.insert(db).await?;
    save_categories(db, aggregate).await
}

pub(super) async fn save_aggregate<C: ConnectionTrait>(
    db: &C,
    aggregate: &BudgetAggregate,
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    budget::ActiveModel::from_aggregate(aggregate, now)
        .update(db)
        .await?;
    save_categories(db, aggregate).await
}

async fn save_categories<C: ConnectionTrait>(
    db: &C,
    aggregate: &BudgetAggregate,
) -> ResultEngine<()> {
    let rows = aggregate
        .categories
        .iter()
        .map(|entry| categories::ActiveModel::from_entry(&aggregate.owner_id, entry));
    categories::Entity::insert_many(rows)
        .on_conflict(
            OnConflict::columns([categories::Column::OwnerId, categories::Column::Category])
                .update_columns([categories::Column::Allocated, categories::Column::Spent])
                .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}

pub(super) async fn find_entry<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> ResultEngine<Option<Transaction>> {
    transactions::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .map(Transaction::try_from)
        .transpose()
}

/// Reads an entry and checks it belongs to `owner_id`.
pub(super) async fn owned_entry<C: ConnectionTrait>(
    db: &C,
    owner_id: &str,
    id: Uuid,
) -> ResultEngine<Transaction> {
    let entry = find_entry(db, id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("transaction {id}")))?;
    if entry.owner_id != owner_id {
        return Err(EngineError::Forbidden(format!(
            "transaction {id} belongs to another user"
        )));
    }
    Ok(entry)
}

/// Newest day first, then newest creation first.
pub(super) async fn list_entries<C: ConnectionTrait>(
    db: &C,
    owner_id: &str,
) -> ResultEngine<Vec<Transaction>> {
    let rows = transactions::Entity::find()
        .filter(transactions::Column::OwnerId.eq(owner_id.to_string()))
        .order_by_desc(transactions::Column::OccurredOn)
        .order_by_desc(transactions::Column::CreatedAt)
        .all(db)
        .await?;
    rows.into_iter().map(Transaction::try_from).collect()
}

/// Entries with `from <= occurred_on < to`, oldest creation first.
pub(super) async fn list_entries_between<C: ConnectionTrait>(
    db: &C,
    owner_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> ResultEngine<Vec<Transaction>> {
    let rows = transactions::Entity::find()
        .filter(transactions::Column::OwnerId.eq(owner_id.to_string()))
        .filter(transactions::Column::OccurredOn.gte(from))
        .filter(transactions::Column::OccurredOn.lt(to))
        .order_by_asc(transactions::Column::CreatedAt)
        .all(db)
        .await?;
    rows.into_iter().map(Transaction::try_from).collect()
}

/// Writes the outcome of a reconciliation: the aggregate and the ledger
/// effect go into the same connection.
pub(super) async fn persist<C: ConnectionTrait>(
    db: &C,
    reconciliation: &Reconciliation,
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    save_aggregate(db, &reconciliation.aggregate, now).await?;
    match &reconciliation.effect {
        LedgerEffect::Insert(entry) => {
            transactions::ActiveModel::from(entry).insert(db).await?;
        }
        LedgerEffect::Replace(entry) => {
            transactions::ActiveModel::from(entry).update(db).await?;
        }
        LedgerEffect::Remove(id) => {
            transactions::Entity::delete_by_id(id.to_string())
                .exec(db)
                .await?;
        }
        LedgerEffect::Unchanged => {}
    }
    Ok(())
}
