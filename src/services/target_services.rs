//! Target services service

use validator::Validate;

use crate::{
    csv_conf::{CsvConfError, TsCsvConf},
    error::{AppError, AppResult},
    models::{
        record::RecordPageQuery,
        target_service::{
            CreateTargetService, CsvConfView, TargetService, TargetServiceDetail,
            TargetServiceShort, UpdateTargetService,
        },
    },
    repository::Repository,
};

/// An empty configuration is allowed (files cannot be uploaded yet);
/// anything else must be complete and unambiguous.
fn check_attached_conf(conf: &TsCsvConf) -> Result<(), CsvConfError> {
    if conf.is_empty() {
        return Ok(());
    }
    conf.check()
}

#[derive(Clone)]
pub struct TargetServicesService {
    repository: Repository,
}

impl TargetServicesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List target services (menu listing)
    pub async fn list(&self) -> AppResult<Vec<TargetServiceShort>> {
        self.repository.target_services.list().await
    }

    /// Target service with its counters and one page of linked records
    pub async fn detail(&self, name: &str, query: &RecordPageQuery) -> AppResult<TargetServiceDetail> {
        let target_service = self.repository.target_services.get_by_name(name).await?;

        let records_count = self
            .repository
            .records
            .count_by_target_service(target_service.id)
            .await?;

        // No need to query for the records themselves otherwise
        let (records_unimarc_count, records) = if records_count > 0 {
            let unimarc = self
                .repository
                .records
                .count_unimarc_by_target_service(target_service.id)
                .await?;
            let records = self
                .repository
                .records
                .list_by_target_service(target_service.id, query.per_page(), query.offset())
                .await?;
            (unimarc, records)
        } else {
            (0, Vec::new())
        };

        Ok(TargetServiceDetail {
            csv_conf_display: target_service.csv_conf.display_string(),
            csv_conf_fields: target_service.csv_conf.n_fields(),
            target_service,
            records_count,
            records_unimarc_count,
            page: query.page(),
            per_page: query.per_page(),
            records,
        })
    }

    /// Register a new target service
    pub async fn create(&self, data: &CreateTargetService) -> AppResult<TargetService> {
        data.validate()?;

        let display_name = data.display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::Validation("Display name can't be empty".to_string()));
        }
        check_attached_conf(&data.csv_conf)?;

        if self.repository.target_services.name_exists(&data.name).await? {
            return Err(AppError::Conflict(format!(
                "Target service {} already exists",
                data.name
            )));
        }

        let created = self
            .repository
            .target_services
            .create(&data.name, display_name, &data.csv_conf)
            .await?;
        tracing::info!("Target service {} created", created.name);
        Ok(created)
    }

    /// Update display name, active flag and CSV configuration.
    /// The name identifies the service and cannot change.
    pub async fn update(&self, name: &str, data: &UpdateTargetService) -> AppResult<TargetService> {
        let display_name = data.display_name.trim();
        if display_name.is_empty() {
            tracing::info!("Display name can't be empty for TS {}", name);
            return Err(AppError::Validation(format!(
                "Display name can't be empty for TS {}",
                name
            )));
        }
        if let Some(ref conf) = data.csv_conf {
            check_attached_conf(conf)?;
        }

        let existing = self.repository.target_services.get_by_name(name).await?;
        let csv_conf = data.csv_conf.as_ref().unwrap_or(&existing.csv_conf.0);
        let active = data.active.unwrap_or(existing.active);

        if active != existing.active {
            let changed = self
                .repository
                .records
                .set_active_for_exclusive(existing.id, active)
                .await?;
            tracing::info!("Target service {}: {} record(s) set active={}", name, changed, active);
        }

        self.repository
            .target_services
            .update(existing.id, display_name, active, csv_conf)
            .await
    }

    /// Delete a target service; records left without any service are deactivated
    pub async fn delete(&self, name: &str) -> AppResult<()> {
        let target_service = self.repository.target_services.get_by_name(name).await?;
        let deactivated = self
            .repository
            .target_services
            .delete(target_service.id)
            .await?;
        tracing::info!(
            "Target service {} deleted, {} record(s) deactivated",
            name,
            deactivated
        );
        Ok(())
    }

    /// Flip the active flag of a target service and of the records linked to it only
    pub async fn toggle_active(&self, name: &str) -> AppResult<TargetService> {
        let target_service = self.repository.target_services.get_by_name(name).await?;
        let active = !target_service.active;

        let changed = self
            .repository
            .records
            .set_active_for_exclusive(target_service.id, active)
            .await?;

        let updated = self
            .repository
            .target_services
            .update(
                target_service.id,
                &target_service.display_name,
                active,
                &target_service.csv_conf,
            )
            .await?;
        tracing::info!("Target service {} active={} ({} record(s) updated)", name, active, changed);
        Ok(updated)
    }

    /// Describe the CSV configuration of a target service
    pub async fn csv_conf(&self, name: &str) -> AppResult<CsvConfView> {
        let target_service = self.repository.target_services.get_by_name(name).await?;
        Ok(CsvConfView::from(&*target_service.csv_conf))
    }
}
