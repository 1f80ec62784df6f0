//! Tabular backing store for the workout log.
//!
//! The log only needs four primitives from a table: read everything,
//! append a row, find a row by its date cell and overwrite one cell.
//! Anything offering those can back the log.

mod json_file;
mod memory;

pub use json_file::JsonSheetStore;
pub use memory::MemorySheetStore;

use crate::errors::StoreError;
use async_trait::async_trait;

/// Column headers, in wire order.
pub const HEADER: [&str; COLUMN_COUNT] = ["Date", "Exercise", "SetIndex", "Reps", "TotalMinutes"];
pub const COLUMN_COUNT: usize = 5;

// 1-based, as spreadsheet columns are addressed.
pub const DATE_COLUMN: usize = 1;
pub const EXERCISE_COLUMN: usize = 2;
pub const SET_INDEX_COLUMN: usize = 3;
pub const REPS_COLUMN: usize = 4;
pub const DURATION_COLUMN: usize = 5;

/// One row as stored: every cell is a string, empty when unset.
pub type RawRow = Vec<String>;

/// Position of a data row, 0-based, header excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHandle(pub usize);

#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn read_all_rows(&self) -> Result<Vec<RawRow>, StoreError>;

    async fn append_row(&self, row: RawRow) -> Result<(), StoreError>;

    /// First data row whose date cell equals `date`.
    async fn find_row_matching(&self, date: &str) -> Result<Option<RowHandle>, StoreError>;

    async fn update_cell(
        &self,
        row: RowHandle,
        column: usize,
        value: String,
    ) -> Result<(), StoreError>;
}

/// Pads or truncates a row to exactly [`COLUMN_COUNT`] cells.
pub(crate) fn normalize(mut row: RawRow) -> RawRow {
    row.resize(COLUMN_COUNT, String::new());
    row
}

pub(crate) fn check_column(column: usize) -> Result<usize, StoreError> {
    if (1..=COLUMN_COUNT).contains(&column) {
        Ok(column - 1)
    } else {
        Err(StoreError::UnknownColumn(column))
    }
}

pub(crate) fn find_in(rows: &[RawRow], date: &str) -> Option<RowHandle> {
    rows.iter()
        .position(|row| row.get(DATE_COLUMN - 1).is_some_and(|cell| cell == date))
        .map(RowHandle)
}
