//! Inspection dataset loading.
//!
//! This module reads the inspection CSV into an immutable in-memory
//! table and validates that the required columns are present.

use crate::config::{ColumnsConfig, Config};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to open dataset {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column '{column}' is missing (found: {found})")]
    MissingColumn { column: String, found: String },

    #[error("Delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
}

/// How to read the dataset: delimiter and required column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub delimiter: u8,
    pub columns: ColumnsConfig,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            delimiter: b',',
            columns: ColumnsConfig::default(),
        }
    }
}

impl Schema {
    /// Build a schema from the data and column settings.
    pub fn from_config(config: &Config) -> Result<Self, DatasetError> {
        let delimiter = config.data.delimiter;
        if !delimiter.is_ascii() {
            return Err(DatasetError::InvalidDelimiter(delimiter));
        }

        Ok(Self {
            delimiter: delimiter as u8,
            columns: config.columns.clone(),
        })
    }
}

/// Positions of the required columns within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    inspection_id: usize,
    vehicle_id: usize,
    inspection_date: usize,
    part_detected: usize,
}

/// Borrowed view of the required fields of one row.
///
/// A `None` field is a null cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectionRecord<'a> {
    pub inspection_id: Option<&'a str>,
    pub vehicle_id: Option<&'a str>,
    pub inspection_date: Option<&'a str>,
    pub part_detected: Option<&'a str>,
}

/// The loaded inspection table.
///
/// Keeps every column of the file so the missing-value summary can
/// report all of them. Never mutated after loading.
#[derive(Debug, Clone)]
pub struct InspectionTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    index: ColumnIndex,
}

impl InspectionTable {
    /// Load the table from a CSV file.
    pub fn load(path: &Path, schema: &Schema) -> Result<Self, DatasetError> {
        info!("Loading dataset: {}", path.display());

        let file = File::open(path).map_err(|source| DatasetError::Open {
            path: path.display().to_string(),
            source,
        })?;

        let table = Self::from_reader(file, schema)?;
        info!(
            "Loaded {} rows across {} columns",
            table.len(),
            table.headers.len()
        );
        Ok(table)
    }

    /// Read the table from any CSV source.
    pub fn from_reader<R: Read>(reader: R, schema: &Schema) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(schema.delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        debug!("Headers: {:?}", headers);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(to_cell).collect());
        }

        Self::from_rows(headers, rows, schema)
    }

    /// Build a table from already split rows.
    pub fn from_rows(
        headers: Vec<String>,
        rows: Vec<Vec<Option<String>>>,
        schema: &Schema,
    ) -> Result<Self, DatasetError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DatasetError::MissingColumn {
                    column: name.to_string(),
                    found: headers.join(", "),
                })
        };

        let index = ColumnIndex {
            inspection_id: find(&schema.columns.inspection_id)?,
            vehicle_id: find(&schema.columns.vehicle_id)?,
            inspection_date: find(&schema.columns.inspection_date)?,
            part_detected: find(&schema.columns.part_detected)?,
        };

        Ok(Self {
            headers,
            rows,
            index,
        })
    }

    /// Column names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Raw cells, one vector per row.
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over the required fields of every row.
    pub fn records(&self) -> impl Iterator<Item = InspectionRecord<'_>> + '_ {
        let index = self.index;
        self.rows.iter().map(move |row| InspectionRecord {
            inspection_id: cell(row, index.inspection_id),
            vehicle_id: cell(row, index.vehicle_id),
            inspection_date: cell(row, index.inspection_date),
            part_detected: cell(row, index.part_detected),
        })
    }

    /// Distinct non-null vehicle IDs in first-appearance order.
    pub fn vehicle_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records()
            .filter_map(|r| r.vehicle_id)
            .filter(|v| seen.insert(*v))
            .collect()
    }
}

/// Field values read as null, in addition to the empty field.
const NULL_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn to_cell(field: &str) -> Option<String> {
    if field.is_empty() || NULL_TOKENS.contains(&field) {
        None
    } else {
        Some(field.to_string())
    }
}

fn cell(row: &[Option<String>], index: usize) -> Option<&str> {
    row.get(index).and_then(|c| c.as_deref())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Parse CSV text with the default schema.
    pub(crate) fn table(csv_text: &str) -> InspectionTable {
        InspectionTable::from_reader(csv_text.as_bytes(), &Schema::default()).unwrap()
    }

    const HEADER: &str = "Inspection ID,Vehicle ID,Inspection date,Part detected";

    #[test]
    fn test_load_fixture() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/inspections.csv");
        let table = InspectionTable::load(&path, &Schema::default()).unwrap();

        assert!(!table.is_empty());
        assert_eq!(table.headers()[0], "Inspection ID");
        assert!(table.vehicle_ids().contains(&"V-101"));
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = InspectionTable::load(&temp_dir.path().join("nope.csv"), &Schema::default())
            .unwrap_err();
        assert!(matches!(err, DatasetError::Open { .. }));
    }

    #[test]
    fn test_missing_required_column() {
        let err = InspectionTable::from_reader(
            "Inspection ID,Vehicle ID,Part detected\n1,A,brake\n".as_bytes(),
            &Schema::default(),
        )
        .unwrap_err();

        match err {
            DatasetError::MissingColumn { column, found } => {
                assert_eq!(column, "Inspection date");
                assert!(found.contains("Vehicle ID"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_fields_are_null() {
        let t = table(&format!("{HEADER},Notes\n1,A,2023-01-01,brake,\n2,, 2023-01-02 ,  ,ok\n"));

        let records: Vec<_> = t.records().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].part_detected, Some("brake"));
        assert_eq!(records[1].vehicle_id, None);
        assert_eq!(records[1].inspection_date, Some("2023-01-02"));
        assert_eq!(records[1].part_detected, None);
        assert_eq!(t.rows()[0][4], None);
    }

    #[test]
    fn test_null_tokens_are_null() {
        let t = table(&format!(
            "{HEADER}\n1,A,NA,brake\n2,B,2023-01-01,N/A\n3,C,2023-01-01,NaN\n4,null,#N/A,tire\n"
        ));

        let records: Vec<_> = t.records().collect();
        assert_eq!(records[0].inspection_date, None);
        assert_eq!(records[1].part_detected, None);
        assert_eq!(records[2].part_detected, None);
        assert_eq!(records[3].vehicle_id, None);
        assert_eq!(records[3].inspection_date, None);

        let parts: Vec<_> = records.iter().map(|r| r.part_detected).collect();
        assert_eq!(parts, vec![Some("brake"), None, None, Some("tire")]);

        let missing: Vec<usize> = crate::analysis::missing_value_summary(&t)
            .into_iter()
            .map(|m| m.missing)
            .collect();
        assert_eq!(missing, vec![0, 1, 2, 2]);
    }

    #[test]
    fn test_null_tokens_are_case_sensitive_words() {
        let t = table(&format!("{HEADER}\n1,Nancy,2023-01-01,Na\n"));
        let record = t.records().next().unwrap();
        assert_eq!(record.vehicle_id, Some("Nancy"));
        assert_eq!(record.part_detected, Some("Na"));
    }

    #[test]
    fn test_short_rows_fill_missing_cells() {
        let t = table(&format!("{HEADER}\n1,A,2023-01-01,brake\n2,B,2023-01-02\n"));

        assert_eq!(t.len(), 2);
        let records: Vec<_> = t.records().collect();
        assert_eq!(records[1].vehicle_id, Some("B"));
        assert_eq!(records[1].part_detected, None);

        let summary = crate::analysis::missing_value_summary(&t);
        assert_eq!(summary[3].column, "Part detected");
        assert_eq!(summary[3].missing, 1);
        assert_eq!(summary[2].missing, 0);
    }

    #[test]
    fn test_header_only_file_is_empty_table() {
        let t = table(&format!("{HEADER}\n"));
        assert!(t.is_empty());
        assert_eq!(t.headers().len(), 4);
        assert!(t.vehicle_ids().is_empty());
    }

    #[test]
    fn test_columns_in_any_order() {
        let t = table(
            "Part detected,Vehicle ID,Inspection date,Inspection ID\n\
             wheel,B,2023-01-01,9\n",
        );
        let record = t.records().next().unwrap();
        assert_eq!(record.inspection_id, Some("9"));
        assert_eq!(record.vehicle_id, Some("B"));
        assert_eq!(record.part_detected, Some("wheel"));
    }

    #[test]
    fn test_vehicle_ids_first_appearance_order() {
        let t = table(&format!(
            "{HEADER}\n1,B,d1,p\n2,A,d1,p\n3,B,d2,p\n4,C,d2,p\n"
        ));
        assert_eq!(t.vehicle_ids(), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_custom_schema() {
        let mut config = Config::default();
        config.data.delimiter = ';';
        config.columns.vehicle_id = "VIN".to_string();
        let schema = Schema::from_config(&config).unwrap();

        let t = InspectionTable::from_reader(
            "Inspection ID;VIN;Inspection date;Part detected\n1;X9;2023-05-01;door\n".as_bytes(),
            &schema,
        )
        .unwrap();
        assert_eq!(t.vehicle_ids(), vec!["X9"]);
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let mut config = Config::default();
        config.data.delimiter = '§';
        assert!(matches!(
            Schema::from_config(&config),
            Err(DatasetError::InvalidDelimiter('§'))
        ));
    }
}
