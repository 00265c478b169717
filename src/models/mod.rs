//! Data models for Abacaxi

pub mod record;
pub mod target_service;
pub mod upload_report;

// Re-export commonly used types
pub use record::{Isbn, Ppn, Record, RecordDraft};
pub use target_service::{TargetService, TargetServiceShort};
pub use upload_report::{RejectedRow, UploadReport};
