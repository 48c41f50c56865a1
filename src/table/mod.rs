//! Typed tables and their conversion to and from cell grids.
//!
//! This module provides:
//! - `Table`, `Column` and `Row` with per-column type inference
//! - The `TableCodec` seam and the default `GridCodec`

pub mod codec;
pub mod types;

pub use codec::{GridCodec, TableCodec};
pub use types::*;
