use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::{AccountId, Position};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct PositionsQuery {
    pub account_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PositionsResponse {
    pub positions: Vec<Position>,
}

pub async fn get_positions(
    Query(params): Query<PositionsQuery>,
    State(state): State<AppState>,
) -> Result<Json<PositionsResponse>, AppError> {
    let positions = state
        .repo
        .list_positions(AccountId::new(params.account_id))
        .await?;
    Ok(Json(PositionsResponse { positions }))
}
