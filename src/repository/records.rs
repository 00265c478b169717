//! Records repository

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{types::Json, Pool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::record::{Record, RecordDraft},
};

#[derive(Clone)]
pub struct RecordsRepository {
    pool: Pool<Postgres>,
}

impl RecordsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get record by ID with its target service names
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Record> {
        let record = sqlx::query_as::<_, Record>("SELECT * FROM records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Record {} not found", id)))?;

        let mut records = vec![record];
        self.load_target_services(&mut records).await?;
        Ok(records.remove(0))
    }

    /// First record carrying any of the given (normalized) ISBNs
    pub async fn find_by_isbns(&self, isbns: &[String]) -> AppResult<Option<Record>> {
        if isbns.is_empty() {
            return Ok(None);
        }

        let record = sqlx::query_as::<_, Record>(
            r#"
            SELECT * FROM records r
            WHERE EXISTS (
                SELECT 1 FROM jsonb_array_elements(r.isbns) AS i
                WHERE i->>'isbn' = ANY($1)
            )
            ORDER BY r.created_at
            LIMIT 1
            "#,
        )
        .bind(isbns)
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(record) => {
                let mut records = vec![record];
                self.load_target_services(&mut records).await?;
                Ok(records.pop())
            }
            None => Ok(None),
        }
    }

    /// Page of records linked to a target service, ordered by title
    pub async fn list_by_target_service(
        &self,
        target_service_id: i32,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Record>> {
        let mut records = sqlx::query_as::<_, Record>(
            r#"
            SELECT r.* FROM records r
            JOIN record_target_services l ON l.record_id = r.id
            WHERE l.target_service_id = $1
            ORDER BY r.title, r.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(target_service_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        self.load_target_services(&mut records).await?;
        Ok(records)
    }

    /// Number of records linked to a target service
    pub async fn count_by_target_service(&self, target_service_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*)::bigint FROM record_target_services WHERE target_service_id = $1",
        )
        .bind(target_service_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Number of records linked to a target service that have a UNIMARC record
    pub async fn count_unimarc_by_target_service(&self, target_service_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)::bigint FROM records r
            JOIN record_target_services l ON l.record_id = r.id
            WHERE l.target_service_id = $1
              AND r.unimarc IS NOT NULL AND r.unimarc <> ''
            "#,
        )
        .bind(target_service_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Fill `target_services` of each record with one query
    async fn load_target_services(&self, records: &mut [Record]) -> AppResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT l.record_id, ts.name FROM record_target_services l
            JOIN target_services ts ON ts.id = l.target_service_id
            WHERE l.record_id = ANY($1)
            ORDER BY ts.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_record: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (record_id, name) in rows {
            by_record.entry(record_id).or_default().push(name);
        }
        for record in records.iter_mut() {
            record.target_services = by_record.remove(&record.id).unwrap_or_default();
        }
        Ok(())
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Insert a record built from a draft and link it to a target service,
    /// both in one transaction
    pub async fn create(
        &self,
        draft: &RecordDraft,
        target_service_id: i32,
        active: bool,
    ) -> AppResult<Uuid> {
        let title = draft
            .title
            .as_deref()
            .ok_or_else(|| AppError::Validation("Record title is required".to_string()))?;
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO records (id, title, authors, publisher, pubdate, edition, lang, url,
                                 isbns, ppns, active, acquired, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, '[]'::jsonb, $10, FALSE, $11)
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(&draft.authors)
        .bind(&draft.publisher)
        .bind(&draft.pubdate)
        .bind(draft.edition)
        .bind(&draft.lang)
        .bind(&draft.url)
        .bind(Json(&draft.isbns))
        .bind(active)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        Self::insert_link(&mut tx, id, target_service_id).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Persist the bibliographic fields and state of an existing record,
    /// linking it to `link_to` in the same transaction
    pub async fn update(&self, record: &Record, link_to: Option<i32>) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE records
            SET title = $1, authors = $2, publisher = $3, pubdate = $4, edition = $5,
                lang = $6, url = $7, isbns = $8, active = $9, updated_at = $10
            WHERE id = $11
            "#,
        )
        .bind(&record.title)
        .bind(&record.authors)
        .bind(&record.publisher)
        .bind(&record.pubdate)
        .bind(record.edition)
        .bind(&record.lang)
        .bind(&record.url)
        .bind(&record.isbns)
        .bind(record.active)
        .bind(Utc::now())
        .bind(record.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Record {} not found", record.id)));
        }
        if let Some(target_service_id) = link_to {
            Self::insert_link(&mut tx, record.id, target_service_id).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Link a record to a target service (no-op when already linked)
    async fn insert_link(
        tx: &mut Transaction<'_, Postgres>,
        record_id: Uuid,
        target_service_id: i32,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO record_target_services (record_id, target_service_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(record_id)
        .bind(target_service_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Set `active` on records whose only target service is the given one
    pub async fn set_active_for_exclusive(
        &self,
        target_service_id: i32,
        active: bool,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE records SET active = $2, updated_at = $3
            WHERE id IN (SELECT record_id FROM record_target_services WHERE target_service_id = $1)
              AND NOT EXISTS (
                  SELECT 1 FROM record_target_services other
                  WHERE other.record_id = records.id AND other.target_service_id <> $1
              )
            "#,
        )
        .bind(target_service_id)
        .bind(active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a record and its links
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Record {} not found", id)));
        }
        Ok(())
    }
}
