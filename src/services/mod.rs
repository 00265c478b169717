//! Business logic services

pub mod records;
pub mod target_services;
pub mod upload;

use crate::{config::UploadConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub target_services: target_services::TargetServicesService,
    pub records: records::RecordsService,
    pub upload: upload::UploadService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, upload_config: UploadConfig) -> Self {
        let records = records::RecordsService::new(repository.clone());
        Self {
            target_services: target_services::TargetServicesService::new(repository.clone()),
            upload: upload::UploadService::new(repository.clone(), records.clone(), upload_config),
            records,
            repository,
        }
    }
}
