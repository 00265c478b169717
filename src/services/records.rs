//! Records service: lookup and reconciliation of imported records

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        record::{normalize_isbn, Record, RecordDraft},
        target_service::TargetService,
        upload_report::RejectedRow,
    },
    repository::Repository,
};

/// Split a `?isbn=` value into normalized ISBNs
pub fn parse_isbn_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_isbn)
        .filter(|isbn| !isbn.is_empty())
        .collect()
}

#[derive(Clone)]
pub struct RecordsService {
    repository: Repository,
}

impl RecordsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get record by ID
    pub async fn get(&self, id: Uuid) -> AppResult<Record> {
        self.repository.records.get_by_id(id).await
    }

    /// Delete a record
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.records.delete(id).await?;
        tracing::info!("Record {} deleted", id);
        Ok(())
    }

    /// Find the record carrying one of the given ISBNs
    pub async fn find_by_isbns(&self, raw: &str) -> AppResult<Record> {
        let isbns = parse_isbn_list(raw);
        if isbns.is_empty() {
            return Err(AppError::BadRequest("At least one ISBN is required".to_string()));
        }
        self.repository
            .records
            .find_by_isbns(&isbns)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No record with ISBN {}", isbns.join(", "))))
    }

    /// Reconcile drafts with stored records by ISBN.
    ///
    /// Each draft is saved in its own transaction. A draft that cannot be
    /// saved is reported in [`Reconciliation::failed`] and the import goes on.
    pub async fn create_or_update(
        &self,
        drafts: &[RecordDraft],
        target_service: &TargetService,
    ) -> Reconciliation {
        let mut outcome = Reconciliation::default();

        for draft in drafts {
            match self.reconcile(draft, target_service).await {
                Ok(ReconcileAction::Create { .. }) => outcome.created += 1,
                Ok(ReconcileAction::Merge { .. }) => outcome.updated += 1,
                Err(e) => {
                    tracing::error!(
                        "could not save record with isbn {}: {}",
                        draft.isbns.first().map(|i| i.isbn.as_str()).unwrap_or("?"),
                        e
                    );
                    outcome.failed.push(RejectedRow {
                        line: draft.line,
                        reason: "could not save record".to_string(),
                    });
                }
            }
        }

        outcome
    }

    async fn reconcile(
        &self,
        draft: &RecordDraft,
        target_service: &TargetService,
    ) -> AppResult<ReconcileAction> {
        let existing = self
            .repository
            .records
            .find_by_isbns(&draft.isbn_keys())
            .await?;
        let action = ReconcileAction::plan(existing.as_ref(), target_service);

        match (action, existing) {
            (ReconcileAction::Create { active }, _) => {
                self.repository
                    .records
                    .create(draft, target_service.id, active)
                    .await?;
            }
            (ReconcileAction::Merge { activate, link }, Some(mut record)) => {
                record.merge_draft(draft);
                if activate {
                    record.active = true;
                }
                let link_to = link.then_some(target_service.id);
                self.repository.records.update(&record, link_to).await?;
            }
            (ReconcileAction::Merge { .. }, None) => {
                return Err(AppError::Internal("merge planned without a record".to_string()))
            }
        }

        Ok(action)
    }
}

/// Counts of one reconciliation run
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub created: u64,
    pub updated: u64,
    /// Drafts whose record could not be saved
    pub failed: Vec<RejectedRow>,
}

/// What importing a draft into a target service does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// New record, active when the target service is
    Create { active: bool },
    /// Merge into the stored record, re-activating it when the target
    /// service is active and linking it when not linked yet
    Merge { activate: bool, link: bool },
}

impl ReconcileAction {
    pub fn plan(existing: Option<&Record>, target_service: &TargetService) -> Self {
        match existing {
            None => ReconcileAction::Create {
                active: target_service.active,
            },
            Some(record) => ReconcileAction::Merge {
                activate: target_service.active,
                link: !record.is_linked_to(&target_service.name),
            },
        }
    }
}
