//! Reads vendor CSV files through a target service configuration.

use std::collections::BTreeMap;
use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::mapping::{CsvConfError, CsvField, TsCsvConf};
use crate::models::{RecordDraft, RejectedRow};

/// Parsing options for an uploaded file
#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    pub delimiter: u8,
    pub has_header: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
        }
    }
}

/// Rows of a file split into importable drafts and rejected lines
#[derive(Debug, Default)]
pub struct CsvImport {
    pub rows_read: usize,
    pub drafts: Vec<RecordDraft>,
    pub rejected: Vec<RejectedRow>,
}

/// Interprets CSV rows according to a checked configuration
#[derive(Debug)]
pub struct CsvConfReader {
    positions: BTreeMap<u32, CsvField>,
    min_width: usize,
    options: ReaderOptions,
}

impl CsvConfReader {
    /// Build a reader; the configuration must pass [`TsCsvConf::check`]
    pub fn new(conf: &TsCsvConf, options: ReaderOptions) -> Result<Self, CsvConfError> {
        conf.check()?;
        Ok(Self {
            positions: conf.to_position_map(),
            min_width: conf.max_position() as usize,
            options,
        })
    }

    /// Read every row of `input`.
    ///
    /// Malformed rows are collected in [`CsvImport::rejected`]; only I/O
    /// failures abort the read.
    pub fn read<R: Read>(&self, input: R) -> Result<CsvImport, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(self.options.has_header)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(input);

        let mut import = CsvImport::default();
        let mut record = StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    import.rows_read += 1;
                    let line = record.position().map(|p| p.line()).unwrap_or(0);
                    match self.interpret(&record) {
                        Ok(mut draft) => {
                            draft.line = line;
                            import.drafts.push(draft);
                        }
                        Err(reason) => import.rejected.push(RejectedRow { line, reason }),
                    }
                }
                Err(e) if e.is_io_error() => return Err(e),
                Err(e) => {
                    import.rows_read += 1;
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    import.rejected.push(RejectedRow {
                        line,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(import)
    }

    /// Turn one row into a draft
    pub fn interpret(&self, row: &StringRecord) -> Result<RecordDraft, String> {
        if row.len() < self.min_width {
            return Err(format!(
                "expected at least {} columns, found {}",
                self.min_width,
                row.len()
            ));
        }

        let mut draft = RecordDraft::default();
        for (&position, field) in &self.positions {
            let Some(cell) = position
                .checked_sub(1)
                .and_then(|index| row.get(index as usize))
            else {
                continue;
            };
            let value = cell.trim();
            if value.is_empty() {
                continue;
            }

            match field {
                CsvField::Authors => draft.authors.push(value.to_string()),
                CsvField::Isbn => draft.push_isbn(value, false),
                CsvField::Eisbn => draft.push_isbn(value, true),
                CsvField::Title => draft.title = Some(value.to_string()),
                CsvField::Publisher => draft.publisher = Some(value.to_string()),
                CsvField::Pubdate => draft.pubdate = Some(value.to_string()),
                CsvField::Lang => draft.lang = Some(value.to_string()),
                CsvField::Url => draft.url = Some(value.to_string()),
                CsvField::Edition => {
                    let edition = value
                        .parse::<i32>()
                        .map_err(|_| format!("edition '{}' is not a number", value))?;
                    draft.edition = Some(edition);
                }
            }
        }

        if draft.title.is_none() {
            return Err("missing title".to_string());
        }
        if draft.isbns.is_empty() {
            return Err("missing isbn and eisbn".to_string());
        }
        Ok(draft)
    }
}
