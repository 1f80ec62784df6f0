use super::{RawRow, RowHandle, SheetStore, check_column, find_in, normalize};
use crate::errors::StoreError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// In-process table. Nothing survives a restart.
#[derive(Default)]
pub struct MemorySheetStore {
    rows: Mutex<Vec<RawRow>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<RawRow>) -> Self {
        Self {
            rows: Mutex::new(rows.into_iter().map(normalize).collect()),
            ..Self::default()
        }
    }

    /// While offline every operation fails as an unreachable store would.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful appends and cell updates so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn read_all_rows(&self) -> Result<Vec<RawRow>, StoreError> {
        self.ensure_online()?;
        Ok(self.rows.lock().await.clone())
    }

    async fn append_row(&self, row: RawRow) -> Result<(), StoreError> {
        self.ensure_online()?;
        self.rows.lock().await.push(normalize(row));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_row_matching(&self, date: &str) -> Result<Option<RowHandle>, StoreError> {
        self.ensure_online()?;
        Ok(find_in(&self.rows.lock().await, date))
    }

    async fn update_cell(
        &self,
        row: RowHandle,
        column: usize,
        value: String,
    ) -> Result<(), StoreError> {
        self.ensure_online()?;
        let index = check_column(column)?;
        let mut rows = self.rows.lock().await;
        let cells = rows.get_mut(row.0).ok_or(StoreError::UnknownRow(row.0))?;
        cells[index] = value;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
