//! Record endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::record::{Record, RecordQuery},
};

/// Find a record by ISBN
#[utoipa::path(
    get,
    path = "/records",
    tag = "records",
    params(RecordQuery),
    responses(
        (status = 200, description = "Matching record", body = Record),
        (status = 400, description = "No ISBN given"),
        (status = 404, description = "No record with these ISBNs")
    )
)]
pub async fn find_record(
    State(state): State<crate::AppState>,
    Query(query): Query<RecordQuery>,
) -> AppResult<Json<Record>> {
    let record = state.services.records.find_by_isbns(&query.isbn).await?;
    Ok(Json(record))
}

/// Get record details by ID
#[utoipa::path(
    get,
    path = "/records/{id}",
    tag = "records",
    params(("id" = Uuid, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record details", body = Record),
        (status = 404, description = "Record not found")
    )
)]
pub async fn get_record(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Record>> {
    let record = state.services.records.get(id).await?;
    Ok(Json(record))
}

/// Delete a record
#[utoipa::path(
    delete,
    path = "/records/{id}",
    tag = "records",
    params(("id" = Uuid, Path, description = "Record ID")),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Record not found")
    )
)]
pub async fn delete_record(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.records.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
