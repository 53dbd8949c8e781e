//! Transactions API endpoints

use api_types::{
    outcome::MutationResponse,
    transaction::{
        TodayResponse, TransactionListResponse, TransactionNew, TransactionUpdate, TransactionView,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use engine::{TransactionDraft, TransactionPatch, users};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    /// Defaults to the current day (UTC).
    pub day: Option<NaiveDate>,
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let txs = state.engine.list_transactions(&user.username).await?;
    Ok(Json(TransactionListResponse {
        transactions: txs.iter().map(views::transaction).collect(),
    }))
}

pub async fn today(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<TodayResponse>, ServerError> {
    let day = query.day.unwrap_or_else(|| Utc::now().date_naive());
    let summary = state.engine.today_summary(&user.username, day).await?;
    Ok(Json(TodayResponse {
        day: summary.day,
        transactions: summary.transactions.iter().map(views::transaction).collect(),
        total: summary.total_minor,
    }))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<MutationResponse>), ServerError> {
    let Json(payload) = payload?;
    let draft = TransactionDraft {
        amount_minor: views::amount(payload.amount)?,
        category: payload.category,
        description: payload.description,
        payment_method: payload.payment_method.map(views::engine_payment_method),
        occurred_on: payload.occurred_on,
    };

    let reconciliation = state
        .engine
        .create_transaction(&user.username, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(views::mutation(reconciliation))))
}

pub async fn get_one(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(&user.username, id).await?;
    Ok(Json(views::transaction(&tx)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<TransactionUpdate>, JsonRejection>,
) -> Result<Json<MutationResponse>, ServerError> {
    let Json(payload) = payload?;
    let patch = TransactionPatch {
        amount_minor: views::amount(payload.amount)?,
        category: payload.category,
        description: payload.description,
        payment_method: payload.payment_method.map(views::engine_payment_method),
        occurred_on: payload.occurred_on,
    };

    let reconciliation = state
        .engine
        .update_transaction(&user.username, id, patch)
        .await?;
    Ok(Json(views::mutation(reconciliation)))
}

pub async fn delete(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MutationResponse>, ServerError> {
    let reconciliation = state
        .engine
        .delete_transaction(&user.username, id)
        .await?;
    Ok(Json(views::mutation(reconciliation)))
}
