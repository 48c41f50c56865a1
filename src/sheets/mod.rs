//! Sheets values API: wire types, the service contract and its transports.
//!
//! This module provides:
//! - `SheetsService`, the four remote calls the range adapter needs
//! - `HttpSheetsClient`, a reqwest implementation against the REST endpoint
//! - `MemorySheets`, an in-process implementation for tests and offline use

pub mod client;
pub mod http_client;
pub mod memory;
pub mod types;

pub use client::SheetsService;
pub use http_client::{Credentials, HttpSheetsClient, DEFAULT_ENDPOINT};
pub use memory::{CallKind, MemorySheets, RecordedCall};
pub use types::*;
