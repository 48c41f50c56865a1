use tracing::debug;

use super::types::{AdapterConfig, SheetError};
use crate::sheets::{MajorDimension, SheetsService, ValueInputOption, ValueRange};
use crate::table::{Column, GridCodec, Table, TableCodec};

/// Reads and writes [`Table`]s against ranges of one spreadsheet.
///
/// Ranges are A1 notation (e.g. `"Sheet1!A1:C5"` or `"Sheet1!A:A"`). A sheet
/// name by itself refers to all the data in that sheet.
///
/// Every operation is one request/response round trip (two for an overwriting
/// write). Nothing is retried.
#[derive(Debug, Clone)]
pub struct RangeAdapter<S, C = GridCodec> {
    service: S,
    config: AdapterConfig,
    codec: C,
}

impl<S: SheetsService> RangeAdapter<S> {
    pub fn new(service: S, config: AdapterConfig) -> Self {
        Self::with_codec(service, config, GridCodec)
    }
}

impl<S: SheetsService, C: TableCodec> RangeAdapter<S, C> {
    pub fn with_codec(service: S, config: AdapterConfig, codec: C) -> Self {
        Self {
            service,
            config,
            codec,
        }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Convert the data in `range` into a table using the configured header rows and index columns.
    pub async fn read_table(&self, range: &str) -> Result<Table, SheetError> {
        debug!(spreadsheet_id = %self.config.spreadsheet_id, range, "reading table");

        let resp = self
            .service
            .batch_get(
                &self.config.spreadsheet_id,
                &[range],
                MajorDimension::Rows,
                self.config.value_render_option,
            )
            .await
            .map_err(|source| SheetError::Fetch {
                range: range.to_string(),
                source,
            })?;

        // Ranges without data come back without values
        let grid = resp
            .value_ranges
            .into_iter()
            .next()
            .map(|vr| vr.values)
            .unwrap_or_default();

        self.codec
            .decode(grid, &self.config.read_options())
            .map_err(|source| SheetError::Convert {
                range: range.to_string(),
                source,
            })
    }

    /// The first data column of `range`.
    pub async fn read_column(&self, range: &str) -> Result<Column, SheetError> {
        let table = self
            .read_table(range)
            .await
            .map_err(|e| SheetError::ReadColumn(Box::new(e)))?;

        table
            .into_columns()
            .into_iter()
            .next()
            .ok_or_else(|| SheetError::NoColumns {
                range: range.to_string(),
            })
    }

    /// Write `table` into `range` beginning at its top-left cell.
    ///
    /// Exactly the configured number of header rows is written, so the table
    /// reads back with the same adapter. Unlabelled columns are headed by their
    /// position.
    ///
    /// With `overwrite` the range is cleared first, so nothing of its previous
    /// content survives. If the clear succeeds and the update fails the range
    /// stays cleared.
    pub async fn write_table(&self, range: &str, table: &Table, overwrite: bool) -> Result<(), SheetError> {
        let values = ValueRange::rows(self.codec.encode(table, self.config.header_rows));

        if overwrite {
            debug!(spreadsheet_id = %self.config.spreadsheet_id, range, "clearing range");
            self.service
                .clear(&self.config.spreadsheet_id, range)
                .await
                .map_err(|source| SheetError::Clear {
                    range: range.to_string(),
                    source,
                })?;
        }

        debug!(
            spreadsheet_id = %self.config.spreadsheet_id,
            range,
            rows = values.values.len(),
            "writing table"
        );
        self.service
            .update(&self.config.spreadsheet_id, range, &values, ValueInputOption::Raw)
            .await
            .map_err(|source| SheetError::Write {
                range: range.to_string(),
                source,
            })?;

        Ok(())
    }

    /// Append the last row of `table` as the next row after the data in `range`.
    ///
    /// When the table has index levels their labels lead the row, matching the
    /// layout `write_table` produces.
    pub async fn append_row(&self, range: &str, table: &Table) -> Result<(), SheetError> {
        let row = table
            .len()
            .checked_sub(1)
            .and_then(|last| self.codec.encode_row(table, last))
            .ok_or(SheetError::EmptyInput)?;

        debug!(spreadsheet_id = %self.config.spreadsheet_id, range, "appending row");
        self.service
            .append(
                &self.config.spreadsheet_id,
                range,
                &ValueRange::rows(vec![row]),
                ValueInputOption::Raw,
            )
            .await
            .map_err(|source| SheetError::Append {
                range: range.to_string(),
                source,
            })?;

        Ok(())
    }
}
