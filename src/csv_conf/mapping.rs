//! Target service CSV configuration and its position map.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Bibliographic field a CSV column can be mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CsvField {
    Authors,
    Eisbn,
    Isbn,
    Lang,
    Pubdate,
    Publisher,
    Title,
    Url,
    Edition,
}

impl CsvField {
    /// Name used in configuration display and JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            CsvField::Authors => "authors",
            CsvField::Eisbn => "eisbn",
            CsvField::Isbn => "isbn",
            CsvField::Lang => "lang",
            CsvField::Pubdate => "pubdate",
            CsvField::Publisher => "publisher",
            CsvField::Title => "title",
            CsvField::Url => "url",
            CsvField::Edition => "edition",
        }
    }
}

impl fmt::Display for CsvField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column positions of a target service's CSV files.
///
/// Positions are 1-based; `0` means the field is absent from the file.
/// Authors may be spread over several columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TsCsvConf {
    pub authors: Vec<u32>,
    pub eisbn: u32,
    pub isbn: u32,
    pub lang: u32,
    pub pubdate: u32,
    pub publisher: u32,
    pub title: u32,
    pub url: u32,
    pub edition: u32,
}

/// Reasons a CSV configuration cannot be used for import
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvConfError {
    #[error("no column is mapped to title")]
    MissingTitle,

    #[error("no column is mapped to isbn or eisbn")]
    MissingIdentifier,

    #[error("column {position} is mapped to several fields: {fields}")]
    DuplicatePosition { position: u32, fields: String },
}

impl TsCsvConf {
    /// Every (position, field) pair in field declaration order.
    /// Author positions are always listed, unset scalar fields are not.
    fn entries(&self) -> Vec<(u32, CsvField)> {
        let mut entries: Vec<(u32, CsvField)> = self
            .authors
            .iter()
            .map(|&position| (position, CsvField::Authors))
            .collect();

        let scalars = [
            (self.eisbn, CsvField::Eisbn),
            (self.isbn, CsvField::Isbn),
            (self.lang, CsvField::Lang),
            (self.pubdate, CsvField::Pubdate),
            (self.publisher, CsvField::Publisher),
            (self.title, CsvField::Title),
            (self.url, CsvField::Url),
            (self.edition, CsvField::Edition),
        ];
        entries.extend(scalars.into_iter().filter(|(position, _)| *position != 0));
        entries
    }

    /// Swap keys and values: column position -> field.
    /// When two fields claim the same position the later one wins.
    pub fn to_position_map(&self) -> BTreeMap<u32, CsvField> {
        self.entries().into_iter().collect()
    }

    /// Number of columns used by this configuration
    pub fn n_fields(&self) -> usize {
        self.to_position_map().len()
    }

    /// True when no column is mapped at all
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Field names ordered by column position, as shown to staff
    pub fn display_string(&self) -> String {
        format_position_map(&self.to_position_map())
    }

    /// A configuration is usable when it has a title and at least one ISBN column
    pub fn is_valid(&self) -> bool {
        self.title != 0 && (self.isbn != 0 || self.eisbn != 0)
    }

    /// Positions claimed by more than one field, ascending
    pub fn duplicate_positions(&self) -> Vec<u32> {
        let mut seen: BTreeMap<u32, usize> = BTreeMap::new();
        for (position, _) in self.entries() {
            if position != 0 {
                *seen.entry(position).or_default() += 1;
            }
        }
        seen.into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(position, _)| position)
            .collect()
    }

    /// Full check used before accepting or importing with a configuration
    pub fn check(&self) -> Result<(), CsvConfError> {
        if self.title == 0 {
            return Err(CsvConfError::MissingTitle);
        }
        if self.isbn == 0 && self.eisbn == 0 {
            return Err(CsvConfError::MissingIdentifier);
        }
        if let Some(&position) = self.duplicate_positions().first() {
            let fields = self
                .entries()
                .into_iter()
                .filter(|(p, _)| *p == position)
                .map(|(_, field)| field.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(CsvConfError::DuplicatePosition { position, fields });
        }
        Ok(())
    }

    /// Minimum number of columns a row needs for every mapped cell to exist
    pub fn max_position(&self) -> u32 {
        self.entries()
            .into_iter()
            .map(|(position, _)| position)
            .max()
            .unwrap_or(0)
    }
}

/// Join the fields of a position map in ascending position order
pub fn format_position_map(map: &BTreeMap<u32, CsvField>) -> String {
    map.values()
        .map(CsvField::as_str)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn springer_conf() -> TsCsvConf {
        TsCsvConf {
            authors: vec![3, 4],
            eisbn: 2,
            isbn: 1,
            title: 5,
            publisher: 7,
            ..Default::default()
        }
    }

    #[test]
    fn test_position_map_swaps_keys_and_values() {
        let map = springer_conf().to_position_map();
        assert_eq!(map.len(), 6);
        assert_eq!(map[&1], CsvField::Isbn);
        assert_eq!(map[&2], CsvField::Eisbn);
        assert_eq!(map[&3], CsvField::Authors);
        assert_eq!(map[&4], CsvField::Authors);
        assert_eq!(map[&5], CsvField::Title);
        assert_eq!(map[&7], CsvField::Publisher);
        assert!(!map.contains_key(&6));
    }

    #[test]
    fn test_unset_scalars_are_skipped() {
        let conf = TsCsvConf {
            title: 1,
            isbn: 2,
            ..Default::default()
        };
        assert_eq!(conf.n_fields(), 2);
        assert!(!conf.to_position_map().contains_key(&0));
    }

    #[test]
    fn test_author_position_zero_is_kept() {
        let conf = TsCsvConf {
            authors: vec![0],
            ..Default::default()
        };
        assert_eq!(conf.to_position_map().get(&0), Some(&CsvField::Authors));
        assert!(!conf.is_empty());
    }

    #[test]
    fn test_later_field_wins_on_collision() {
        let conf = TsCsvConf {
            isbn: 2,
            title: 2,
            ..Default::default()
        };
        let map = conf.to_position_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&2], CsvField::Title);
        assert_eq!(conf.n_fields(), 1);
        assert_eq!(conf.duplicate_positions(), vec![2]);
    }

    #[test]
    fn test_display_string_is_ordered_by_position() {
        assert_eq!(
            springer_conf().display_string(),
            "isbn; eisbn; authors; authors; title; publisher"
        );
        assert_eq!(TsCsvConf::default().display_string(), "");
    }

    #[test]
    fn test_is_valid() {
        assert!(springer_conf().is_valid());

        let eisbn_only = TsCsvConf {
            title: 1,
            eisbn: 2,
            ..Default::default()
        };
        assert!(eisbn_only.is_valid());

        let no_title = TsCsvConf {
            isbn: 1,
            ..Default::default()
        };
        assert!(!no_title.is_valid());

        let no_identifier = TsCsvConf {
            title: 1,
            authors: vec![2],
            ..Default::default()
        };
        assert!(!no_identifier.is_valid());

        assert!(!TsCsvConf::default().is_valid());
    }

    #[test]
    fn test_check_reports_reason() {
        assert_eq!(springer_conf().check(), Ok(()));
        assert_eq!(TsCsvConf::default().check(), Err(CsvConfError::MissingTitle));
        assert_eq!(
            TsCsvConf {
                title: 1,
                ..Default::default()
            }
            .check(),
            Err(CsvConfError::MissingIdentifier)
        );

        let clash = TsCsvConf {
            authors: vec![3],
            title: 1,
            isbn: 3,
            ..Default::default()
        };
        assert_eq!(
            clash.check(),
            Err(CsvConfError::DuplicatePosition {
                position: 3,
                fields: "authors, isbn".to_string(),
            })
        );
    }

    #[test]
    fn test_max_position() {
        assert_eq!(springer_conf().max_position(), 7);
        assert_eq!(TsCsvConf::default().max_position(), 0);
    }

    #[test]
    fn test_deserialize_partial_conf() {
        let conf: TsCsvConf =
            serde_json::from_str(r#"{"title": 2, "isbn": 1, "authors": [3]}"#).unwrap();
        assert_eq!(conf.title, 2);
        assert_eq!(conf.isbn, 1);
        assert_eq!(conf.authors, vec![3]);
        assert_eq!(conf.eisbn, 0);
    }
}
