use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info};
use uuid::Uuid;

use super::{AppState, MAX_UPLOAD_SIZE};
use crate::domain::AccountId;
use crate::error::AppError;
use crate::import::drain_uploads;

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub account_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub staged: usize,
}

/// Stage uploaded export files and kick off ingestion in the background.
/// The response only acknowledges staging; callers observe completion
/// through the position endpoints.
pub async fn import_transactions(
    Query(params): Query<ImportQuery>,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    let account_id = AccountId::new(params.account_id);
    // Per-account staging keeps one account's drain from ingesting
    // another account's files.
    let upload_dir = PathBuf::from(&state.config.upload_dir).join(account_id.as_i64().to_string());

    tokio::fs::create_dir_all(&upload_dir)
        .await
        .map_err(|e| AppError::Internal(format!("creating upload directory: {}", e)))?;

    let mut staged = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {}", e)))?
    {
        let file_name = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("reading upload {}: {}", file_name, e)))?;

        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::BadRequest(format!(
                "file {} exceeds the {} byte upload limit",
                file_name, MAX_UPLOAD_SIZE
            )));
        }

        // Uuid prefix keeps concurrent uploads of identically named
        // exports from clobbering each other in the staging area.
        let staged_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(&file_name));
        let staged_path = upload_dir.join(staged_name);

        tokio::fs::write(&staged_path, &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("staging upload: {}", e)))?;
        staged += 1;
    }

    if staged == 0 {
        return Err(AppError::BadRequest("no files in upload".to_string()));
    }

    info!(
        account_id = account_id.as_i64(),
        staged, "staged import files"
    );

    let repo = state.repo.clone();
    let recomputer = state.recomputer.clone();
    tokio::spawn(async move {
        match drain_uploads(&repo, account_id, &upload_dir).await {
            Ok(_) => {
                if let Err(e) = recomputer.recompute_account(account_id).await {
                    error!(account_id = account_id.as_i64(), error = %e, "recompute after import failed");
                }
            }
            Err(e) => {
                error!(account_id = account_id.as_i64(), error = %e, "import ingestion failed");
            }
        }
    });

    Ok((StatusCode::ACCEPTED, Json(ImportResponse { staged })))
}

/// Keep only the final path component of a client-supplied file name.
fn sanitize_file_name(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or("upload.json")
        .to_string()
}
