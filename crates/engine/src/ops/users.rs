use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{BudgetAggregate, EngineError, ResultEngine, users};

use super::{Engine, store, with_tx};

impl Engine {
    /// Creates a user together with a budget funded with `initial_budget`.
    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        initial_budget: i64,
    ) -> ResultEngine<BudgetAggregate> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::MissingField("username".to_string()));
        }
        if password.is_empty() {
            return Err(EngineError::MissingField("password".to_string()));
        }
        if initial_budget < 0 {
            return Err(EngineError::InvalidAmount(
                "initial budget must be >= 0".to_string(),
            ));
        }

        let _guard = self.locks.acquire(username).await;
        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username.to_string()));
            }

            let now = Utc::now();
            users::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                password: ActiveValue::Set(password.to_string()),
                created_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            let aggregate = BudgetAggregate::with_total(username, initial_budget);
            // a budget may already exist if the owner id was used before registration
            if store::find_aggregate(&db_tx, username).await?.is_some() {
                store::save_aggregate(&db_tx, &aggregate, now).await?;
            } else {
                store::insert_aggregate(&db_tx, &aggregate, now).await?;
            }
            tracing::info!(user = username, initial_budget, "user registered");
            Ok(aggregate)
        })
    }
}
