//! Schema definition and type inference for ingested columns.

use crate::data::frame::DataFrame;
use serde::{Deserialize, Serialize};

/// Column data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    String,
}

impl ColumnType {
    /// Whether values of this type are stored as `f64`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

/// Schema definition for a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub columns: Vec<ColumnSchema>,
}

/// Schema for a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub dtype: ColumnType,
    pub nullable: bool,
}

/// Cell contents treated as missing values.
static MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A",
];

pub fn is_missing(raw: &str) -> bool {
    MISSING_TOKENS.contains(&raw.trim())
}

fn parse_bool(raw: &str) -> Option<bool> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Infer a column type from raw cell strings.
///
/// A column with no observed values is a float column of missing values.
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a str>) -> ColumnType {
    let mut has_int = false;
    let mut has_float = false;
    let mut has_bool = false;
    let mut has_string = false;

    for raw in values {
        if is_missing(raw) {
            continue;
        }
        let s = raw.trim();
        if s.parse::<i64>().is_ok() {
            has_int = true;
        } else if s.parse::<f64>().is_ok() {
            has_float = true;
        } else if parse_bool(s).is_some() {
            has_bool = true;
        } else {
            has_string = true;
        }
    }

    if has_string || (has_bool && (has_int || has_float)) {
        return ColumnType::String;
    }
    if has_bool {
        return ColumnType::Boolean;
    }
    if has_float {
        return ColumnType::Float;
    }
    if has_int {
        return ColumnType::Integer;
    }
    ColumnType::Float
}

/// Describe the columns of a frame.
pub fn infer_schema(frame: &DataFrame) -> SchemaDefinition {
    let columns = frame
        .columns()
        .iter()
        .map(|col| ColumnSchema {
            name: col.name.clone(),
            dtype: col.dtype.clone(),
            nullable: col.values.missing_count() > 0,
        })
        .collect();

    SchemaDefinition { columns }
}
