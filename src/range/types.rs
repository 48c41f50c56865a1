use serde::{Deserialize, Serialize};

use crate::sheets::{ServiceError, ValueRenderOption};
use crate::table::{ReadOptions, TableError};

/// Where and how a [`RangeAdapter`](super::RangeAdapter) reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfig {
    pub spreadsheet_id: String,
    /// Leading rows of a range treated as column headers
    #[serde(default)]
    pub header_rows: usize,
    /// Leading columns of a range treated as the row index
    #[serde(default)]
    pub index_cols: usize,
    #[serde(default)]
    pub value_render_option: ValueRenderOption,
}

impl AdapterConfig {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        AdapterConfig {
            spreadsheet_id: spreadsheet_id.into(),
            ..Default::default()
        }
    }

    pub fn header_rows(mut self, n: usize) -> Self {
        self.header_rows = n;
        self
    }

    pub fn index_cols(mut self, n: usize) -> Self {
        self.index_cols = n;
        self
    }

    pub fn value_render_option(mut self, render: ValueRenderOption) -> Self {
        self.value_render_option = render;
        self
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            header_rows: self.header_rows,
            index_cols: self.index_cols,
        }
    }
}

/// Errors returned by the range adapter, tagged with the failing operation.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("read_table(): retrieving data from {range}: {source}")]
    Fetch {
        range: String,
        #[source]
        source: ServiceError,
    },

    #[error("read_table(): converting data from {range}: {source}")]
    Convert {
        range: String,
        #[source]
        source: TableError,
    },

    #[error("read_column(): {0}")]
    ReadColumn(#[source] Box<SheetError>),

    #[error("read_column(): {range} has no data columns")]
    NoColumns { range: String },

    #[error("write_table().clear(): {range}: {source}")]
    Clear {
        range: String,
        #[source]
        source: ServiceError,
    },

    #[error("write_table().update(): {range}: {source}")]
    Write {
        range: String,
        #[source]
        source: ServiceError,
    },

    #[error("append_row(): table cannot be empty")]
    EmptyInput,

    #[error("append_row(): {range}: {source}")]
    Append {
        range: String,
        #[source]
        source: ServiceError,
    },
}

/// Errors parsing A1 notation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("range is empty")]
    Empty,

    #[error("invalid range: {0}")]
    Invalid(String),
}

impl RangeError {
    pub fn invalid(range: &str) -> Self {
        RangeError::Invalid(range.to_string())
    }
}
