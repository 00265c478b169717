//! Report returned after a CSV upload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A CSV row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RejectedRow {
    /// 1-based line number in the uploaded file
    pub line: u64,
    pub reason: String,
}

/// Outcome of importing one file into a target service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadReport {
    pub target_service: String,
    /// Data rows read (header excluded)
    pub rows_read: usize,
    pub created: u64,
    pub updated: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedRow>,
}
