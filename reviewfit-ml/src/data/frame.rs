//! In-memory table of named, typed columns.

use crate::data::schema::ColumnType;
use crate::error::MlError;
use serde::{Deserialize, Serialize};

/// Values of a single column. Missing numeric cells are `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnValues {
    Numeric(Vec<f64>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn missing_count(&self) -> usize {
        match self {
            Self::Numeric(v) => v.iter().filter(|x| x.is_nan()).count(),
            Self::Text(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    fn select(&self, indices: &[usize]) -> Self {
        match self {
            Self::Numeric(v) => Self::Numeric(indices.iter().map(|&i| v[i]).collect()),
            Self::Text(v) => Self::Text(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            dtype: ColumnType::Float,
            values: ColumnValues::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            dtype: ColumnType::String,
            values: ColumnValues::Text(values),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.values, ColumnValues::Numeric(_))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.values {
            ColumnValues::Numeric(v) => Some(v),
            ColumnValues::Text(_) => None,
        }
    }
}

/// A table of equally long, uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl DataFrame {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a frame, checking column lengths and name uniqueness.
    pub fn new(columns: Vec<Column>) -> Result<Self, MlError> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        for (i, col) in columns.iter().enumerate() {
            if col.len() != n_rows {
                return Err(MlError::dataset(format!(
                    "column '{}' has {} rows, expected {}",
                    col.name,
                    col.len(),
                    n_rows
                )));
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(MlError::dataset(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
        }
        Ok(Self { columns, n_rows })
    }

    /// Frame with a known row count and no columns yet.
    pub fn with_rows(n_rows: usize) -> Self {
        Self {
            columns: Vec::new(),
            n_rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.n_rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column, MlError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| MlError::missing_column(name))
    }

    pub fn column_mut(&mut self, name: &str) -> Result<&mut Column, MlError> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| MlError::missing_column(name))
    }

    /// Append a column. Its length must match the frame.
    pub fn push_column(&mut self, column: Column) -> Result<(), MlError> {
        if column.len() != self.n_rows {
            return Err(MlError::shape_mismatch(self.n_rows, column.len()));
        }
        if self.position(&column.name).is_some() {
            return Err(MlError::dataset(format!(
                "duplicate column name '{}'",
                column.name
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Remove and return a column.
    pub fn remove_column(&mut self, name: &str) -> Result<Column, MlError> {
        let idx = self
            .position(name)
            .ok_or_else(|| MlError::missing_column(name))?;
        Ok(self.columns.remove(idx))
    }

    /// Keep only the columns matching `keep`, in their original order.
    pub fn retain_columns(&mut self, keep: impl FnMut(&Column) -> bool) {
        self.columns.retain(keep);
    }

    /// New frame holding the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self, MlError> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_rows) {
            return Err(MlError::dataset(format!(
                "row index {bad} out of bounds for {} rows",
                self.n_rows
            )));
        }
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                dtype: c.dtype.clone(),
                values: c.values.select(indices),
            })
            .collect();
        Ok(Self {
            columns,
            n_rows: indices.len(),
        })
    }
}
