//! Repository layer for database operations

pub mod records;
pub mod target_services;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub records: records::RecordsRepository,
    pub target_services: target_services::TargetServicesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            records: records::RecordsRepository::new(pool.clone()),
            target_services: target_services::TargetServicesRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database, used by the readiness probe
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
