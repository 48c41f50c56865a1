use serde::{Deserialize, Serialize};

use crate::sheets::CellValue;

/// Inferred type of a column's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// No non-empty values
    #[default]
    Empty,
    Bool,
    Number,
    String,
    Mixed,
}

impl DataType {
    fn of(value: &CellValue) -> Option<DataType> {
        match value {
            v if v.is_empty() => None,
            CellValue::Bool(_) => Some(DataType::Bool),
            CellValue::Number(_) => Some(DataType::Number),
            CellValue::String(_) => Some(DataType::String),
            CellValue::Empty => None,
        }
    }

    /// A column has a single type when all of its non-empty values agree.
    pub fn infer(values: &[CellValue]) -> DataType {
        let mut inferred = DataType::Empty;
        for kind in values.iter().filter_map(DataType::of) {
            inferred = match inferred {
                DataType::Empty => kind,
                current if current == kind => current,
                _ => return DataType::Mixed,
            };
        }
        inferred
    }
}

/// A named sequence of values.
///
/// `labels` holds one entry per header level, outermost first. A column read
/// without header rows has no labels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Column {
    labels: Vec<String>,
    values: Vec<CellValue>,
    dtype: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self::with_labels(vec![name.into()], values)
    }

    pub fn unnamed(values: Vec<CellValue>) -> Self {
        Self::with_labels(Vec::new(), values)
    }

    pub fn with_labels(labels: Vec<String>, values: Vec<CellValue>) -> Self {
        let dtype = DataType::infer(&values);
        Column { labels, values, dtype }
    }

    /// Innermost label
    pub fn name(&self) -> Option<&str> {
        self.labels.last().map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<CellValue> {
        self.values
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&CellValue> {
        self.values.get(row)
    }
}

/// One data row: index labels followed by column values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub labels: Vec<CellValue>,
    pub values: Vec<CellValue>,
}

impl Row {
    /// Index labels and values as a single row of cells
    pub fn into_cells(self) -> Vec<CellValue> {
        let mut cells = self.labels;
        cells.extend(self.values);
        cells
    }
}

/// A typed table with an optional (possibly multi-level) row index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    index: Vec<Column>,
    columns: Vec<Column>,
    len: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let len = check_lengths(&columns, None)?;
        Ok(Table {
            index: Vec::new(),
            columns,
            len: len.unwrap_or(0),
        })
    }

    /// Build a table from column names and data rows. Short rows are padded with empty cells.
    pub fn from_rows<S: AsRef<str>>(names: &[S], rows: Vec<Vec<CellValue>>) -> Result<Self, TableError> {
        let mut values: Vec<Vec<CellValue>> = vec![Vec::with_capacity(rows.len()); names.len()];
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() > names.len() {
                return Err(TableError::RowTooWide {
                    row: row_idx,
                    expected: names.len(),
                    found: row.len(),
                });
            }
            let mut cells = row.into_iter();
            for column in values.iter_mut() {
                column.push(cells.next().unwrap_or_default());
            }
        }

        let columns = names
            .iter()
            .zip(values)
            .map(|(name, values)| Column::new(name.as_ref(), values))
            .collect();
        Table::new(columns)
    }

    /// Attach index levels. Each level must have as many values as the table has rows.
    pub fn with_index(mut self, index: Vec<Column>) -> Result<Self, TableError> {
        let expected = if self.columns.is_empty() { None } else { Some(self.len) };
        let len = check_lengths(&index, expected)?;
        if let Some(len) = len {
            self.len = len;
        }
        self.index = index;
        Ok(self)
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of data columns, excluding index levels
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn index(&self) -> &[Column] {
        &self.index
    }

    pub fn col_at(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == Some(name))
    }

    /// Column names, falling back to the 0-based position for unnamed columns.
    pub fn column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| c.name().map(str::to_string).unwrap_or_else(|| i.to_string()))
            .collect()
    }

    pub fn row(&self, n: usize) -> Option<Row> {
        if n >= self.len {
            return None;
        }
        let pick = |cols: &[Column]| -> Vec<CellValue> {
            cols.iter()
                .map(|c| c.get(n).cloned().unwrap_or_default())
                .collect()
        };
        Some(Row {
            labels: pick(&self.index),
            values: pick(&self.columns),
        })
    }

    pub fn last_row(&self) -> Option<Row> {
        self.len.checked_sub(1).and_then(|n| self.row(n))
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}

fn check_lengths(columns: &[Column], expected: Option<usize>) -> Result<Option<usize>, TableError> {
    let expected = expected.or_else(|| columns.first().map(Column::len));
    if let Some(expected) = expected {
        for (i, column) in columns.iter().enumerate() {
            if column.len() != expected {
                return Err(TableError::LengthMismatch {
                    column: column.name().map(str::to_string).unwrap_or_else(|| i.to_string()),
                    expected,
                    found: column.len(),
                });
            }
        }
    }
    Ok(expected)
}

/// Options for converting a grid into a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOptions {
    /// Leading rows used as column labels
    pub header_rows: usize,
    /// Leading columns used as the row index
    pub index_cols: usize,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("column {column} has {found} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("row {row} has {found} values but only {expected} columns are named")]
    RowTooWide {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("expected {expected} header rows, grid has {found} rows")]
    MissingHeaderRows { expected: usize, found: usize },

    #[error("expected {expected} index columns, grid has {found} columns")]
    MissingIndexColumns { expected: usize, found: usize },
}
