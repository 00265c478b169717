//! Record model: one e-book or journal holding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// ISBN attached to a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Isbn {
    pub isbn: String,
    /// True for an e-ISBN
    pub electronic: bool,
    pub primary: bool,
}

/// SUDOC record identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Ppn {
    pub ppn: String,
    pub electronic: bool,
    pub primary: bool,
}

/// Full record model (DB + API)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Record {
    pub id: Uuid,
    pub title: String,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub pubdate: Option<String>,
    pub edition: Option<i32>,
    pub lang: Option<String>,
    pub url: Option<String>,
    #[schema(value_type = Vec<Isbn>)]
    pub isbns: Json<Vec<Isbn>>,
    #[schema(value_type = Vec<Ppn>)]
    pub ppns: Json<Vec<Ppn>>,
    /// Serialized UNIMARC record, when one has been harvested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unimarc: Option<String>,
    pub active: bool,
    pub acquired: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Names of the target services this record belongs to (loaded separately)
    #[sqlx(skip)]
    #[serde(default)]
    pub target_services: Vec<String>,
}

/// Bibliographic data read from one CSV row, before reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    /// Line of the uploaded file the draft was read from
    pub line: u64,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub pubdate: Option<String>,
    pub edition: Option<i32>,
    pub lang: Option<String>,
    pub url: Option<String>,
    pub isbns: Vec<Isbn>,
}

/// Record lookup parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RecordQuery {
    /// ISBN or e-ISBN, comma separated for several
    pub isbn: String,
}

/// Page of records linked to a target service
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RecordPageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl RecordPageQuery {
    pub const DEFAULT_PER_PAGE: i64 = 100;
    pub const MAX_PER_PAGE: i64 = 500;

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }
}

/// Strip hyphens and spaces from an ISBN and upper-case the `x` check character
pub fn normalize_isbn(isbn: &str) -> String {
    isbn.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .map(|c| if c == 'x' { 'X' } else { c })
        .collect()
}

impl RecordDraft {
    /// Add an ISBN, skipping blanks and ISBNs already present.
    /// The first ISBN added becomes the primary one.
    pub fn push_isbn(&mut self, raw: &str, electronic: bool) {
        let isbn = normalize_isbn(raw);
        if isbn.is_empty() || self.isbns.iter().any(|i| i.isbn == isbn) {
            return;
        }
        let primary = self.isbns.is_empty();
        self.isbns.push(Isbn {
            isbn,
            electronic,
            primary,
        });
    }

    /// ISBN strings used to look up an existing record
    pub fn isbn_keys(&self) -> Vec<String> {
        self.isbns.iter().map(|i| i.isbn.clone()).collect()
    }
}

impl Record {
    /// Whether the record is linked to the named target service
    pub fn is_linked_to(&self, target_service: &str) -> bool {
        self.target_services.iter().any(|ts| ts == target_service)
    }

    /// Apply freshly imported data to an existing record.
    ///
    /// Values present in the draft replace stored ones; ISBNs are merged,
    /// keeping existing entries and their primary flag.
    pub fn merge_draft(&mut self, draft: &RecordDraft) {
        if let Some(title) = &draft.title {
            self.title = title.clone();
        }
        if !draft.authors.is_empty() {
            self.authors = draft.authors.clone();
        }
        if draft.publisher.is_some() {
            self.publisher = draft.publisher.clone();
        }
        if draft.pubdate.is_some() {
            self.pubdate = draft.pubdate.clone();
        }
        if draft.edition.is_some() {
            self.edition = draft.edition;
        }
        if draft.lang.is_some() {
            self.lang = draft.lang.clone();
        }
        if draft.url.is_some() {
            self.url = draft.url.clone();
        }

        let has_primary = self.isbns.iter().any(|i| i.primary);
        for isbn in &draft.isbns {
            if self.isbns.iter().all(|i| i.isbn != isbn.isbn) {
                self.isbns.push(Isbn {
                    primary: isbn.primary && !has_primary,
                    ..isbn.clone()
                });
            }
        }
    }
}
