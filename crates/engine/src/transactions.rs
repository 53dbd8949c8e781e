//! Ledger entries.
//!
//! A `Transaction` records one expense of an owner. The ledger only stores
//! entries; the budget numbers derived from them live in
//! [`BudgetAggregate`](crate::BudgetAggregate).

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CategoryRef, EngineError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    #[serde(rename = "QRIS")]
    Qris,
    DebitTransfer,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Qris => "QRIS",
            Self::DebitTransfer => "DebitTransfer",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Cash" => Ok(Self::Cash),
            "QRIS" => Ok(Self::Qris),
            "DebitTransfer" => Ok(Self::DebitTransfer),
            other => Err(EngineError::MissingField(format!(
                "payment_method: unsupported value {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub owner_id: String,
    pub amount_minor: i64,
    pub category: CategoryRef,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub occurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Entries recorded on one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: NaiveDate,
    pub transactions: Vec<Transaction>,
    pub total_minor: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub amount_minor: i64,
    pub category: String,
    pub description: String,
    pub payment_method: String,
    pub occurred_on: Date,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            owner_id: ActiveValue::Set(tx.owner_id.clone()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            category: ActiveValue::Set(tx.category.as_str().to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            payment_method: ActiveValue::Set(tx.payment_method.as_str().to_string()),
            occurred_on: ActiveValue::Set(tx.occurred_on),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound(format!("transaction {}", model.id)))?,
            owner_id: model.owner_id,
            amount_minor: model.amount_minor,
            category: CategoryRef::parse(&model.category),
            description: model.description,
            payment_method: PaymentMethod::try_from(model.payment_method.as_str())?,
            occurred_on: model.occurred_on,
            created_at: model.created_at,
        })
    }
}
