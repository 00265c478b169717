//! Target services repository

use chrono::Utc;
use sqlx::{types::Json, Pool, Postgres};

use crate::{
    csv_conf::TsCsvConf,
    error::{is_unique_violation, AppError, AppResult},
    models::target_service::{TargetService, TargetServiceShort},
};

#[derive(Clone)]
pub struct TargetServicesRepository {
    pool: Pool<Postgres>,
}

impl TargetServicesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all target services ordered by name
    pub async fn list(&self) -> AppResult<Vec<TargetServiceShort>> {
        let rows = sqlx::query_as::<_, TargetServiceShort>(
            "SELECT name, display_name, active FROM target_services ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get target service by name
    pub async fn get_by_name(&self, name: &str) -> AppResult<TargetService> {
        sqlx::query_as::<_, TargetService>("SELECT * FROM target_services WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::TargetServiceNotFound(name.to_string()))
    }

    /// Check whether a name is already taken
    pub async fn name_exists(&self, name: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM target_services WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a new, active target service.
    ///
    /// A name taken concurrently is reported as a conflict.
    pub async fn create(
        &self,
        name: &str,
        display_name: &str,
        csv_conf: &TsCsvConf,
    ) -> AppResult<TargetService> {
        let row = sqlx::query_as::<_, TargetService>(
            r#"
            INSERT INTO target_services (name, display_name, active, csv_conf, created_at)
            VALUES ($1, $2, TRUE, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(display_name)
        .bind(Json(csv_conf))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Target service {} already exists", name))
            } else {
                AppError::from(e)
            }
        })?;
        Ok(row)
    }

    /// Replace the editable fields of a target service
    pub async fn update(
        &self,
        id: i32,
        display_name: &str,
        active: bool,
        csv_conf: &TsCsvConf,
    ) -> AppResult<TargetService> {
        sqlx::query_as::<_, TargetService>(
            r#"
            UPDATE target_services
            SET display_name = $1, active = $2, csv_conf = $3, updated_at = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(display_name)
        .bind(active)
        .bind(Json(csv_conf))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Target service {} not found", id)))
    }

    /// Delete a target service.
    ///
    /// Records linked to this service only are deactivated first; links are
    /// removed by the cascade. Returns the number of deactivated records.
    pub async fn delete(&self, id: i32) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let deactivated = sqlx::query(
            r#"
            UPDATE records SET active = FALSE, updated_at = $2
            WHERE id IN (SELECT record_id FROM record_target_services WHERE target_service_id = $1)
              AND NOT EXISTS (
                  SELECT 1 FROM record_target_services other
                  WHERE other.record_id = records.id AND other.target_service_id <> $1
              )
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let result = sqlx::query("DELETE FROM target_services WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Target service {} not found", id)));
        }

        tx.commit().await?;
        Ok(deactivated)
    }
}
