//! CSV upload service

use crate::{
    config::UploadConfig,
    csv_conf::{CsvConfReader, ReaderOptions},
    error::{AppError, AppResult},
    models::upload_report::UploadReport,
    repository::Repository,
};

use super::records::RecordsService;

#[derive(Clone)]
pub struct UploadService {
    repository: Repository,
    records: RecordsService,
    config: UploadConfig,
}

impl UploadService {
    pub fn new(repository: Repository, records: RecordsService, config: UploadConfig) -> Self {
        Self {
            repository,
            records,
            config,
        }
    }

    /// Options applied when the upload does not override them
    pub fn default_options(&self) -> ReaderOptions {
        ReaderOptions {
            delimiter: self.config.delimiter_byte(),
            has_header: true,
        }
    }

    /// Import a CSV file into a target service
    pub async fn upload(
        &self,
        target_service_name: &str,
        data: &[u8],
        options: ReaderOptions,
    ) -> AppResult<UploadReport> {
        let target_service = self
            .repository
            .target_services
            .get_by_name(target_service_name)
            .await?;

        if target_service.csv_conf.is_empty() {
            return Err(AppError::BusinessRule(format!(
                "Target service {} has no CSV configuration",
                target_service.name
            )));
        }

        let reader = CsvConfReader::new(&target_service.csv_conf, options)?;
        let import = reader
            .read(data)
            .map_err(|e| AppError::Upload(format!("could not read CSV file: {}", e)))?;

        for rejected in &import.rejected {
            tracing::warn!(
                "{}: line {} rejected: {}",
                target_service.name,
                rejected.line,
                rejected.reason
            );
        }

        let outcome = self
            .records
            .create_or_update(&import.drafts, &target_service)
            .await;

        let mut rejected = import.rejected;
        rejected.extend(outcome.failed);
        rejected.sort_by_key(|row| row.line);

        tracing::info!(
            "{}: {} row(s) read, {} created, {} updated, {} rejected",
            target_service.name,
            import.rows_read,
            outcome.created,
            outcome.updated,
            rejected.len()
        );

        Ok(UploadReport {
            target_service: target_service.name,
            rows_read: import.rows_read,
            created: outcome.created,
            updated: outcome.updated,
            rejected,
        })
    }
}
