//! Target services API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        record::RecordPageQuery,
        target_service::{
            CreateTargetService, CsvConfView, TargetService, TargetServiceDetail,
            TargetServiceShort, UpdateTargetService,
        },
    },
};

/// List target services
#[utoipa::path(
    get,
    path = "/target-services",
    tag = "target_services",
    responses(
        (status = 200, description = "Target services list", body = Vec<TargetServiceShort>)
    )
)]
pub async fn list_target_services(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<TargetServiceShort>>> {
    let listing = state.services.target_services.list().await?;
    Ok(Json(listing))
}

/// Register a target service
#[utoipa::path(
    post,
    path = "/target-services",
    tag = "target_services",
    request_body = CreateTargetService,
    responses(
        (status = 201, description = "Target service created", body = TargetService),
        (status = 400, description = "Invalid name or display name"),
        (status = 409, description = "Name already taken"),
        (status = 422, description = "Invalid CSV configuration")
    )
)]
pub async fn create_target_service(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateTargetService>,
) -> AppResult<(StatusCode, Json<TargetService>)> {
    let created = state.services.target_services.create(&data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a target service with its records
#[utoipa::path(
    get,
    path = "/target-services/{name}",
    tag = "target_services",
    params(
        ("name" = String, Path, description = "Target service name"),
        RecordPageQuery
    ),
    responses(
        (status = 200, description = "Target service details", body = TargetServiceDetail),
        (status = 404, description = "Target service not found")
    )
)]
pub async fn get_target_service(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
    Query(query): Query<RecordPageQuery>,
) -> AppResult<Json<TargetServiceDetail>> {
    let detail = state.services.target_services.detail(&name, &query).await?;
    Ok(Json(detail))
}

/// Update a target service
#[utoipa::path(
    put,
    path = "/target-services/{name}",
    tag = "target_services",
    params(("name" = String, Path, description = "Target service name")),
    request_body = UpdateTargetService,
    responses(
        (status = 200, description = "Target service updated", body = TargetService),
        (status = 400, description = "Empty display name"),
        (status = 404, description = "Target service not found"),
        (status = 422, description = "Invalid CSV configuration")
    )
)]
pub async fn update_target_service(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
    Json(data): Json<UpdateTargetService>,
) -> AppResult<Json<TargetService>> {
    let updated = state.services.target_services.update(&name, &data).await?;
    Ok(Json(updated))
}

/// Delete a target service and unlink its records
#[utoipa::path(
    delete,
    path = "/target-services/{name}",
    tag = "target_services",
    params(("name" = String, Path, description = "Target service name")),
    responses(
        (status = 204, description = "Target service deleted"),
        (status = 404, description = "Target service not found")
    )
)]
pub async fn delete_target_service(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    state.services.target_services.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Switch a target service on or off
#[utoipa::path(
    post,
    path = "/target-services/{name}/toggle-active",
    tag = "target_services",
    params(("name" = String, Path, description = "Target service name")),
    responses(
        (status = 200, description = "New state of the target service", body = TargetService),
        (status = 404, description = "Target service not found")
    )
)]
pub async fn toggle_target_service(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<TargetService>> {
    let updated = state.services.target_services.toggle_active(&name).await?;
    Ok(Json(updated))
}

/// Describe the CSV configuration of a target service
#[utoipa::path(
    get,
    path = "/target-services/{name}/csv-conf",
    tag = "target_services",
    params(("name" = String, Path, description = "Target service name")),
    responses(
        (status = 200, description = "CSV configuration", body = CsvConfView),
        (status = 404, description = "Target service not found")
    )
)]
pub async fn get_csv_conf(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<CsvConfView>> {
    let view = state.services.target_services.csv_conf(&name).await?;
    Ok(Json(view))
}
