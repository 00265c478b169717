//! CSV column mapping
//!
//! A target service declares which column of its vendor spreadsheets holds
//! which bibliographic field. This module converts that declaration into a
//! position-indexed map, validates it, and reads uploaded files through it.

pub mod mapping;
pub mod reader;

pub use mapping::{format_position_map, CsvConfError, CsvField, TsCsvConf};
pub use reader::{CsvConfReader, CsvImport, ReaderOptions};
