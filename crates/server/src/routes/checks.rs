use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use models::Check;
use serde::{Deserialize, Serialize};
use service::health::ListPage;

use super::ServerState;
use crate::errors::JsonApiError;

#[derive(Debug, Deserialize)]
pub struct CreateCheckInput {
    pub endpoint: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedCheck {
    pub id: String,
    pub endpoint: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
}

impl ListQuery {
    /// Unparsable or missing page numbers read as 0; the service turns that into page 1.
    fn page(&self) -> i64 {
        self.page.as_deref().and_then(|p| p.trim().parse().ok()).unwrap_or(0)
    }
}

/// Register an endpoint
pub async fn create_check(
    State(state): State<ServerState>,
    payload: Result<Json<CreateCheckInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedCheck>), JsonApiError> {
    let Json(input) = payload
        .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "Bad Request", Some(e.body_text())))?;
    let check = state.checks.create(&input.endpoint).await?;
    Ok((StatusCode::CREATED, Json(CreatedCheck { id: check.id, endpoint: check.endpoint })))
}

/// List one page of checks
pub async fn list_checks(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListPage>, JsonApiError> {
    Ok(Json(state.checks.list(query.page()).await?))
}

/// Read a check by id
pub async fn get_check(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Check>, JsonApiError> {
    Ok(Json(state.checks.read(&id).await?))
}

/// Delete a check by id
pub async fn delete_check(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    state.checks.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
