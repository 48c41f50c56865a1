//! Read and write typed tables against Google Sheets ranges.
//!
//! A [`RangeAdapter`] holds a [`SheetsService`] client, a spreadsheet id and
//! the number of header rows and index columns to expect. It offers four
//! operations, each a single round trip to the values API:
//!
//! - `read_table`: fetch a range and convert it into a [`Table`]
//! - `read_column`: the first column of `read_table`
//! - `write_table`: write a table into a range, optionally clearing it first
//! - `append_row`: append the last row of a table after the data in a range
//!
//! ```rust,ignore
//! let config = SheetsConfig::from_file("credentials/sheet.json")?.apply_env();
//! let adapter = config.connect()?;
//! let table = adapter.read_table("Sheet1!A1:C20").await?;
//! adapter.append_row("Log", &table).await?;
//! ```

pub mod config;
pub mod range;
pub mod sheets;
pub mod table;

pub use config::{ConfigError, SheetsConfig};
pub use range::{A1Range, AdapterConfig, RangeAdapter, RangeError, SheetError};
pub use sheets::{CellValue, Credentials, Grid, HttpSheetsClient, MemorySheets, ServiceError, SheetsService};
pub use table::{Column, DataType, GridCodec, ReadOptions, Row, Table, TableCodec, TableError};
