use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    #[serde(rename = "QRIS")]
    Qris,
    DebitTransfer,
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryGroup {
        Essential,
        Lifestyle,
        Other,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        /// Stable key, e.g. `water/gallon`.
        pub key: String,
        pub label: String,
        pub group: CategoryGroup,
        pub allocated: i64,
        pub spent: i64,
        /// Always `allocated - spent`.
        pub remaining: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub total_budget: i64,
        pub current_balance: i64,
        pub total_spent: i64,
        pub categories: Vec<CategoryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetResponse {
        pub budget: BudgetView,
        pub is_critical: bool,
        pub critical_message: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryAllocation {
        /// Category key (`emergency-fund`) or its display label
        /// (`Emergency Fund`), matched exactly and case-sensitively.
        pub name: String,
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetInitialize {
        pub total_budget: i64,
        #[serde(default)]
        pub category_allocations: Vec<CategoryAllocation>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub amount: i64,
        pub category: String,
        pub description: String,
        pub payment_method: PaymentMethod,
        pub occurred_on: NaiveDate,
        pub created_at: DateTime<Utc>,
    }

    /// Amount as sent by the client.
    ///
    /// Fractions and text are kept instead of failing the body, so the server
    /// can answer them with an invalid-amount error. Text may use the Rupiah
    /// notation, e.g. `"Rp50.000"`.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum AmountInput {
        Minor(i64),
        Fractional(f64),
        Text(String),
    }

    impl From<i64> for AmountInput {
        fn from(value: i64) -> Self {
            Self::Minor(value)
        }
    }

    /// Body of `POST /transactions`.
    ///
    /// Every field is optional on the wire so that a missing one is reported
    /// as a validation error instead of a parse error.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub amount: Option<AmountInput>,
        /// Key or display label, as for
        /// [`CategoryAllocation::name`](crate::budget::CategoryAllocation::name).
        /// Other names are recorded as unknown categories.
        pub category: Option<String>,
        pub description: Option<String>,
        pub payment_method: Option<PaymentMethod>,
        /// Defaults to today.
        pub occurred_on: Option<NaiveDate>,
    }

    /// Body of `PUT /transactions/{id}`. Absent fields keep their value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub amount: Option<AmountInput>,
        pub category: Option<String>,
        pub description: Option<String>,
        pub payment_method: Option<PaymentMethod>,
        pub occurred_on: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TodayResponse {
        pub day: NaiveDate,
        pub transactions: Vec<TransactionView>,
        pub total: i64,
    }
}

pub mod outcome {
    use super::*;

    /// Result of every budget mutation.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MutationResponse {
        pub budget: budget::BudgetView,
        /// Entry written by the mutation, absent for deletes and budget
        /// operations.
        pub transaction: Option<transaction::TransactionView>,
        pub is_critical: bool,
        pub critical_message: Option<String>,
        pub warnings: Vec<String>,
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
