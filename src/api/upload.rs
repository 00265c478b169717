//! CSV upload endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Multipart;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::upload_report::UploadReport,
};

/// Multipart form accepted by the upload endpoint
#[derive(ToSchema)]
pub struct UploadForm {
    /// CSV file laid out as described by the target service configuration
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Column separator, a single character or `tab`
    pub delimiter: Option<String>,
    /// Whether the first line is a header (default: true)
    pub has_header: Option<bool>,
}

fn parse_delimiter(value: &str) -> AppResult<u8> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        v if v.len() == 1 && v.is_ascii() => Ok(v.as_bytes()[0]),
        v => Err(AppError::BadRequest(format!("Invalid delimiter '{}'", v))),
    }
}

fn parse_flag(value: &str) -> AppResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        v => Err(AppError::BadRequest(format!("Invalid boolean '{}'", v))),
    }
}

/// Upload a CSV file of records for a target service
#[utoipa::path(
    post,
    path = "/target-services/{name}/upload",
    tag = "target_services",
    params(("name" = String, Path, description = "Target service name")),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import report", body = UploadReport),
        (status = 400, description = "Missing or unreadable file"),
        (status = 404, description = "Target service not found"),
        (status = 422, description = "Target service has no usable CSV configuration")
    )
)]
pub async fn upload_csv(
    State(state): State<crate::AppState>,
    Path(name): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadReport>> {
    let mut options = state.services.upload.default_options();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(e.to_string()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Upload(e.to_string()))?;
                file = Some(bytes);
            }
            "delimiter" | "has_header" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Upload(e.to_string()))?;
                if field_name == "delimiter" {
                    options.delimiter = parse_delimiter(&text)?;
                } else {
                    options.has_header = parse_flag(&text)?;
                }
            }
            other => tracing::debug!("Ignoring upload field {}", other),
        }
    }

    let file = file.ok_or_else(|| AppError::Upload("Missing 'file' field".to_string()))?;
    let report = state.services.upload.upload(&name, &file, options).await?;
    Ok(Json(report))
}
