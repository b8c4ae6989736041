//! Data source abstraction for loading the review dataset.

use crate::data::frame::{Column, ColumnValues, DataFrame};
use crate::data::schema::{infer_column_type, is_missing};
use crate::error::MlError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Information about a data source for logging and run records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceInfo {
    pub source_type: String,
    pub location: String,
    pub accessed_at: chrono::DateTime<chrono::Utc>,
    pub row_count: Option<usize>,
}

/// Trait for loading a table from a source.
pub trait DataSource {
    /// Load the whole table.
    fn load(&self) -> Result<DataFrame, MlError>;

    /// Return metadata about this source.
    fn source_info(&self) -> DataSourceInfo;
}

// ---------------------------------------------------------------------------
// CsvSource
// ---------------------------------------------------------------------------

/// Delimited text file data source.
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub path: PathBuf,
    pub delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for CsvSource {
    fn load(&self) -> Result<DataFrame, MlError> {
        // Not-found and permission failures surface as IO errors rather than CSV errors.
        let file = std::fs::File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(MlError::dataset(format!(
                "Empty CSV file: {}",
                self.path.display()
            )));
        }

        let mut records = Vec::new();
        for record in reader.records() {
            records.push(record?);
        }

        let mut frame = DataFrame::with_rows(records.len());
        for (idx, name) in headers.iter().enumerate() {
            let cells = || records.iter().map(move |r| r.get(idx).unwrap_or(""));
            let dtype = infer_column_type(cells());
            let values = if dtype.is_numeric() {
                ColumnValues::Numeric(
                    cells()
                        .map(|raw| {
                            if is_missing(raw) {
                                f64::NAN
                            } else {
                                raw.trim().parse::<f64>().unwrap_or(f64::NAN)
                            }
                        })
                        .collect(),
                )
            } else {
                ColumnValues::Text(
                    cells()
                        .map(|raw| (!is_missing(raw)).then(|| raw.to_string()))
                        .collect(),
                )
            };
            frame.push_column(Column {
                name: name.clone(),
                dtype,
                values,
            })?;
        }

        tracing::debug!(
            path = %self.path.display(),
            rows = frame.row_count(),
            columns = frame.column_count(),
            "Loaded CSV"
        );
        Ok(frame)
    }

    fn source_info(&self) -> DataSourceInfo {
        DataSourceInfo {
            source_type: "csv".to_string(),
            location: self.path.display().to_string(),
            accessed_at: chrono::Utc::now(),
            row_count: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::ColumnType;
    use std::io::Write;

    fn column_type(frame: &DataFrame, name: &str) -> Result<ColumnType, MlError> {
        Ok(frame.column(name)?.dtype.clone())
    }

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_mixed_columns() {
        let file = write_csv(
            "id,price,comment,flag\n1,10.5,great,true\n2,,\"late, broken\",false\n3,7,,true\n",
        );
        let frame = CsvSource::new(file.path()).load().unwrap();
        assert_eq!(frame.row_count(), 3);
        assert_eq!(frame.column_names(), vec!["id", "price", "comment", "flag"]);

        assert_eq!(column_type(&frame, "id").unwrap(), ColumnType::Integer);
        assert_eq!(column_type(&frame, "price").unwrap(), ColumnType::Float);
        assert_eq!(column_type(&frame, "comment").unwrap(), ColumnType::String);
        assert_eq!(column_type(&frame, "flag").unwrap(), ColumnType::Boolean);

        let price = frame.column("price").unwrap().as_numeric().unwrap();
        assert_eq!(price[0], 10.5);
        assert!(price[1].is_nan());

        match &frame.column("comment").unwrap().values {
            ColumnValues::Text(v) => {
                assert_eq!(v[1].as_deref(), Some("late, broken"));
                assert_eq!(v[2], None);
            }
            other => panic!("expected text column, got {other:?}"),
        }
    }

    #[test]
    fn test_load_semicolon_delimited() {
        let file = write_csv("a;b\n1;2\n3;4\n");
        let frame = CsvSource::new(file.path())
            .with_delimiter(b';')
            .load()
            .unwrap();
        assert_eq!(frame.column_count(), 2);
        assert_eq!(frame.column("b").unwrap().as_numeric().unwrap(), &[2.0, 4.0]);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = CsvSource::new("/definitely/not/here.csv").load().unwrap_err();
        assert!(matches!(err, MlError::Io(_)));
    }

    #[test]
    fn test_load_empty_file() {
        let file = write_csv("");
        let err = CsvSource::new(file.path()).load().unwrap_err();
        assert!(matches!(err, MlError::Dataset(_)));
    }

    #[test]
    fn test_load_header_only() {
        let file = write_csv("a,b\n");
        let frame = CsvSource::new(file.path()).load().unwrap();
        assert_eq!(frame.row_count(), 0);
        assert_eq!(frame.column_count(), 2);
    }

    #[test]
    fn test_ragged_row_is_csv_error() {
        let file = write_csv("a,b\n1,2\n3\n");
        let err = CsvSource::new(file.path()).load().unwrap_err();
        assert!(matches!(err, MlError::Csv(_)));
    }

    #[test]
    fn test_duplicate_header_is_dataset_error() {
        let file = write_csv("a,a\n1,2\n");
        let err = CsvSource::new(file.path()).load().unwrap_err();
        assert!(matches!(err, MlError::Dataset(msg) if msg.contains("'a'")));
    }

    #[test]
    fn test_invalid_utf8_is_csv_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b\n1,\xff\xfe\n").unwrap();
        let err = CsvSource::new(file.path()).load().unwrap_err();
        assert!(matches!(err, MlError::Csv(_)));
    }

    #[test]
    fn test_source_info() {
        let info = CsvSource::new("data/olist.csv").source_info();
        assert_eq!(info.source_type, "csv");
        assert!(info.location.ends_with("olist.csv"));
    }
}
