//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, records, target_services, upload};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Abacaxi API",
        version = "0.1.0",
        description = "E-resources metadata hub REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Target services
        target_services::list_target_services,
        target_services::create_target_service,
        target_services::get_target_service,
        target_services::update_target_service,
        target_services::delete_target_service,
        target_services::toggle_target_service,
        target_services::get_csv_conf,
        upload::upload_csv,
        // Records
        records::find_record,
        records::get_record,
        records::delete_record,
    ),
    components(
        schemas(
            // Target services
            crate::models::target_service::TargetService,
            crate::models::target_service::TargetServiceShort,
            crate::models::target_service::TargetServiceDetail,
            crate::models::target_service::CreateTargetService,
            crate::models::target_service::UpdateTargetService,
            crate::models::target_service::CsvConfView,
            crate::csv_conf::TsCsvConf,
            crate::csv_conf::CsvField,
            // Upload
            upload::UploadForm,
            crate::models::upload_report::UploadReport,
            crate::models::upload_report::RejectedRow,
            // Records
            crate::models::record::Record,
            crate::models::record::Isbn,
            crate::models::record::Ppn,
            crate::models::record::RecordQuery,
            crate::models::record::RecordPageQuery,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "target_services", description = "Target service (vendor package) management"),
        (name = "records", description = "Bibliographic records")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
