//! The module contains the per-owner budget aggregate.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{CategoryKey, CategoryTable, EngineError};

use super::categories;

/// Budget state of one owner.
///
/// `current_balance` always equals `total_budget` minus the sum of the ledger
/// amounts recorded against it, and every category `spent` equals the sum of
/// the ledger amounts recorded under that key. Only reconciliation changes
/// these numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetAggregate {
    pub owner_id: String,
    pub total_budget: i64,
    pub current_balance: i64,
    pub categories: CategoryTable,
}

impl BudgetAggregate {
    /// Fresh aggregate with all amounts at zero.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            total_budget: 0,
            current_balance: 0,
            categories: CategoryTable::new(),
        }
    }

    /// Fresh aggregate funded with `total_budget`.
    pub fn with_total(owner_id: impl Into<String>, total_budget: i64) -> Self {
        Self {
            total_budget,
            current_balance: total_budget,
            ..Self::new(owner_id)
        }
    }

    pub fn total_spent(&self) -> i64 {
        self.categories.total_spent()
    }

    /// Difference between the stored balance and the one implied by the
    /// category spends.
    ///
    /// Zero as long as no spend was recorded under an unknown category and no
    /// restore was clamped. Saturates at the `i64` bounds.
    pub fn ledger_drift(&self) -> i64 {
        self.current_balance
            .saturating_sub(self.total_budget.saturating_sub(self.total_spent()))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub owner_id: String,
    pub total_budget: i64,
    pub current_balance: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::categories::Entity")]
    Categories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_aggregate(aggregate: &BudgetAggregate, now: DateTime<Utc>) -> Self {
        Self {
            owner_id: ActiveValue::Set(aggregate.owner_id.clone()),
            total_budget: ActiveValue::Set(aggregate.total_budget),
            current_balance: ActiveValue::Set(aggregate.current_balance),
            created_at: ActiveValue::NotSet,
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl TryFrom<(Model, Vec<categories::Model>)> for BudgetAggregate {
    type Error = EngineError;

    /// Rebuilds the aggregate from its rows. Category rows the table does not
    /// know are skipped and missing ones stay at zero.
    fn try_from((model, rows): (Model, Vec<categories::Model>)) -> Result<Self, Self::Error> {
        let mut table = CategoryTable::new();
        for row in rows {
            let Some(key) = CategoryKey::from_name(&row.category) else {
                tracing::warn!(
                    owner = %model.owner_id,
                    category = %row.category,
                    "ignoring stored category outside the fixed table"
                );
                continue;
            };
            table.set_allocation(key, row.allocated);
            table.set_spent(key, row.spent);
        }
        Ok(Self {
            owner_id: model.owner_id,
            total_budget: model.total_budget,
            current_balance: model.current_balance,
            categories: table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_total_starts_fully_available() {
        let aggregate = BudgetAggregate::with_total("alice", 1_000_000);
        assert_eq!(aggregate.current_balance, 1_000_000);
        assert_eq!(aggregate.total_spent(), 0);
        assert_eq!(aggregate.ledger_drift(), 0);
    }

    #[test]
    fn drift_counts_untracked_spend() {
        let mut aggregate = BudgetAggregate::with_total("alice", 1_000_000);
        aggregate.current_balance -= 20_000;
        assert_eq!(aggregate.ledger_drift(), -20_000);

        aggregate.categories.record_spend(CategoryKey::Food, 20_000).unwrap();
        assert_eq!(aggregate.ledger_drift(), 0);
    }

    #[test]
    fn rows_rebuild_the_table() {
        let now = Utc::now();
        let model = Model {
            owner_id: "alice".to_string(),
            total_budget: 500_000,
            current_balance: 450_000,
            created_at: now,
            updated_at: now,
        };
        let rows = vec![
            categories::Model {
                owner_id: "alice".to_string(),
                category: "food".to_string(),
                allocated: 200_000,
                spent: 50_000,
            },
            categories::Model {
                owner_id: "alice".to_string(),
                category: "retired".to_string(),
                allocated: 1,
                spent: 1,
            },
        ];
        let aggregate = BudgetAggregate::try_from((model, rows)).unwrap();
        let food = aggregate.categories.get(CategoryKey::Food);
        assert_eq!(food.allocated, 200_000);
        assert_eq!(food.remaining(), 150_000);
        assert_eq!(aggregate.categories.total_spent(), 50_000);
        assert_eq!(aggregate.ledger_drift(), 0);
    }
}
