//! The range adapter and A1 range notation.

pub mod a1;
pub mod adapter;
pub mod types;

pub use a1::{column_index, column_letter, A1Range, CellRect, CellRef};
pub use adapter::RangeAdapter;
pub use types::*;
