use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::AppState;
use crate::domain::{AccountId, Action, Decimal, NewTransaction, Symbol, Transaction};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    pub account_id: i64,
    pub symbol: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

pub async fn get_transactions(
    Query(params): Query<TransactionsQuery>,
    State(state): State<AppState>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let account_id = AccountId::new(params.account_id);
    let symbol = params.symbol.as_deref().filter(|s| !s.is_empty());
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(50).clamp(1, 500);

    let transactions = state
        .repo
        .list_transactions(account_id, symbol, page, limit)
        .await?;
    let total = state.repo.count_transactions(account_id, symbol).await?;

    Ok(Json(TransactionsResponse {
        transactions,
        total,
        page,
        limit,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub account_id: i64,
    pub date: NaiveDate,
    pub action: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub fees: Decimal,
    #[serde(default)]
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CreateTransactionResponse {
    pub id: i64,
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<CreateTransactionResponse>), AppError> {
    let action = Action::from_str(&req.action)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let account_id = AccountId::new(req.account_id);
    let new = NewTransaction {
        account_id,
        date: req.date,
        action,
        symbol: Symbol::new(req.symbol.trim().to_string()),
        description: req.description.trim().to_string(),
        quantity: req.quantity,
        price: req.price,
        fees: req.fees,
        amount: req.amount,
    };

    let id = state.repo.insert_transaction(&new).await?;
    state.recomputer.recompute_account(account_id).await?;

    Ok((StatusCode::CREATED, Json(CreateTransactionResponse { id })))
}

pub async fn delete_transaction(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let existing = state
        .repo
        .get_transaction(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("transaction {}", id)))?;

    state.repo.delete_transaction(id).await?;
    state
        .recomputer
        .recompute_account(existing.account_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
