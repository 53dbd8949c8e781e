//! Budget API endpoints

use api_types::{
    budget::{BudgetInitialize, BudgetResponse},
    outcome::MutationResponse,
};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use engine::{InitializeBudgetCmd, users};

use crate::{ServerError, server::ServerState, views};

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetResponse>, ServerError> {
    let aggregate = state.engine.budget(&user.username).await?;
    Ok(Json(views::budget_response(&aggregate)))
}

pub async fn initialize(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    payload: Result<Json<BudgetInitialize>, JsonRejection>,
) -> Result<Json<MutationResponse>, ServerError> {
    let Json(payload) = payload?;
    let cmd = payload
        .category_allocations
        .into_iter()
        .fold(InitializeBudgetCmd::new(payload.total_budget), |cmd, a| {
            cmd.allocate(a.name, a.amount)
        });

    let reconciliation = state.engine.initialize_budget(&user.username, cmd).await?;
    Ok(Json(views::mutation(reconciliation)))
}

pub async fn recompute(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<MutationResponse>, ServerError> {
    let reconciliation = state.engine.recompute_budget(&user.username).await?;
    Ok(Json(views::mutation(reconciliation)))
}
