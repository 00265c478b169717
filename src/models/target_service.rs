//! Target service model: a vendor package of e-books or journals.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use validator::Validate;

use super::record::Record;
use crate::csv_conf::{CsvField, TsCsvConf};

/// Target service names end up in URLs
pub static TS_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid target service name regex"));

/// Target service record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TargetService {
    pub id: i32,
    /// Unique identifier used in URLs
    pub name: String,
    pub display_name: String,
    pub active: bool,
    #[schema(value_type = TsCsvConf)]
    pub csv_conf: Json<TsCsvConf>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Short representation for menus and listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TargetServiceShort {
    pub name: String,
    pub display_name: String,
    pub active: bool,
}

/// Create target service request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTargetService {
    #[validate(regex(
        path = *TS_NAME_RE,
        message = "Name may only contain letters, digits, '-' and '_'"
    ))]
    pub name: String,
    #[validate(length(min = 1, message = "Display name can't be empty"))]
    pub display_name: String,
    #[serde(default)]
    pub csv_conf: TsCsvConf,
}

/// Update target service request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTargetService {
    pub display_name: String,
    pub active: Option<bool>,
    pub csv_conf: Option<TsCsvConf>,
}

/// Target service page: the service, its counters and a page of records
#[derive(Debug, Serialize, ToSchema)]
pub struct TargetServiceDetail {
    pub target_service: TargetService,
    pub records_count: i64,
    pub records_unimarc_count: i64,
    pub page: i64,
    pub per_page: i64,
    pub records: Vec<Record>,
    pub csv_conf_display: String,
    pub csv_conf_fields: usize,
}

/// Description of a target service's CSV configuration
#[derive(Debug, Serialize, ToSchema)]
pub struct CsvConfView {
    pub conf: TsCsvConf,
    /// Column position -> field name
    #[schema(value_type = Object)]
    pub positions: BTreeMap<u32, CsvField>,
    pub n_fields: usize,
    pub display: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&TsCsvConf> for CsvConfView {
    fn from(conf: &TsCsvConf) -> Self {
        let positions = conf.to_position_map();
        Self {
            n_fields: positions.len(),
            display: crate::csv_conf::format_position_map(&positions),
            positions,
            valid: conf.is_valid(),
            error: conf.check().err().map(|e| e.to_string()),
            conf: conf.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let ok = CreateTargetService {
            name: "springer_ebooks-2017".to_string(),
            display_name: "Springer e-books 2017".to_string(),
            csv_conf: TsCsvConf::default(),
        };
        assert!(ok.validate().is_ok());

        let bad_name = CreateTargetService {
            name: "springer ebooks".to_string(),
            display_name: "Springer".to_string(),
            csv_conf: TsCsvConf::default(),
        };
        assert!(bad_name.validate().is_err());

        let no_display = CreateTargetService {
            name: "springer".to_string(),
            display_name: String::new(),
            csv_conf: TsCsvConf::default(),
        };
        assert!(no_display.validate().is_err());
    }

    #[test]
    fn test_csv_conf_view() {
        let conf = TsCsvConf {
            title: 2,
            isbn: 1,
            authors: vec![3],
            ..Default::default()
        };
        let view = CsvConfView::from(&conf);
        assert_eq!(view.n_fields, 3);
        assert_eq!(view.display, "isbn; title; authors");
        assert!(view.valid);
        assert!(view.error.is_none());

        let view = CsvConfView::from(&TsCsvConf::default());
        assert_eq!(view.n_fields, 0);
        assert!(!view.valid);
        assert!(view.error.is_some());
    }
}
