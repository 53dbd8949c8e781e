//! Conversions from engine values to the wire types.

use api_types::{
    budget::{BudgetResponse, BudgetView, CategoryGroup, CategoryView},
    outcome::MutationResponse,
    transaction::{AmountInput, TransactionView},
};
use engine::{BudgetAggregate, CategoryEntry, EngineError, Money, Reconciliation, Transaction};

/// Reads a client amount as whole Rupiah.
///
/// Sign and range are left to the engine.
pub(crate) fn amount(input: Option<AmountInput>) -> Result<Option<i64>, EngineError> {
    input
        .map(|input| match input {
            AmountInput::Minor(amount) => Ok(amount),
            AmountInput::Fractional(amount) => Err(EngineError::InvalidAmount(format!(
                "amount must be a whole number of rupiah, got {amount}"
            ))),
            AmountInput::Text(raw) => raw.parse::<Money>().map(Money::minor),
        })
        .transpose()
}

pub(crate) fn payment_method(method: engine::PaymentMethod) -> api_types::PaymentMethod {
    match method {
        engine::PaymentMethod::Cash => api_types::PaymentMethod::Cash,
        engine::PaymentMethod::Qris => api_types::PaymentMethod::Qris,
        engine::PaymentMethod::DebitTransfer => api_types::PaymentMethod::DebitTransfer,
    }
}

pub(crate) fn engine_payment_method(method: api_types::PaymentMethod) -> engine::PaymentMethod {
    match method {
        api_types::PaymentMethod::Cash => engine::PaymentMethod::Cash,
        api_types::PaymentMethod::Qris => engine::PaymentMethod::Qris,
        api_types::PaymentMethod::DebitTransfer => engine::PaymentMethod::DebitTransfer,
    }
}

fn group(group: engine::CategoryGroup) -> CategoryGroup {
    match group {
        engine::CategoryGroup::Essential => CategoryGroup::Essential,
        engine::CategoryGroup::Lifestyle => CategoryGroup::Lifestyle,
        engine::CategoryGroup::Other => CategoryGroup::Other,
    }
}

fn category(entry: &CategoryEntry) -> CategoryView {
    CategoryView {
        key: entry.key.as_str().to_string(),
        label: entry.key.label().to_string(),
        group: group(entry.group()),
        allocated: entry.allocated,
        spent: entry.spent,
        remaining: entry.remaining(),
    }
}

pub(crate) fn budget(aggregate: &BudgetAggregate) -> BudgetView {
    BudgetView {
        total_budget: aggregate.total_budget,
        current_balance: aggregate.current_balance,
        total_spent: aggregate.total_spent(),
        categories: aggregate.categories.iter().map(category).collect(),
    }
}

pub(crate) fn budget_response(aggregate: &BudgetAggregate) -> BudgetResponse {
    let alert = engine::critical_alert(aggregate);
    BudgetResponse {
        budget: budget(aggregate),
        is_critical: alert.is_some(),
        critical_message: alert.map(|a| a.message),
    }
}

pub(crate) fn transaction(tx: &Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        amount: tx.amount_minor,
        category: tx.category.as_str().to_string(),
        description: tx.description.clone(),
        payment_method: payment_method(tx.payment_method),
        occurred_on: tx.occurred_on,
        created_at: tx.created_at,
    }
}

pub(crate) fn mutation(reconciliation: Reconciliation) -> MutationResponse {
    MutationResponse {
        budget: budget(&reconciliation.aggregate),
        transaction: reconciliation.effect.entry().map(transaction),
        is_critical: reconciliation.is_critical(),
        critical_message: reconciliation.alert.map(|a| a.message),
        warnings: reconciliation
            .warnings
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_accepts_whole_rupiah_only() {
        assert_eq!(amount(None), Ok(None));
        assert_eq!(amount(Some(AmountInput::Minor(-5))), Ok(Some(-5)));
        assert_eq!(
            amount(Some(AmountInput::Text("Rp50.000".to_string()))),
            Ok(Some(50_000))
        );
        assert!(matches!(
            amount(Some(AmountInput::Fractional(1.5))),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            amount(Some(AmountInput::Text("lots".to_string()))),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn amount_input_reads_any_json_number_or_string() {
        let parse = |raw: &str| serde_json::from_str::<AmountInput>(raw).unwrap();
        assert_eq!(parse("150000"), AmountInput::Minor(150_000));
        assert_eq!(parse("1.5"), AmountInput::Fractional(1.5));
        assert_eq!(parse("\"lots\""), AmountInput::Text("lots".to_string()));
        assert!(serde_json::from_str::<AmountInput>("true").is_err());
    }
}
