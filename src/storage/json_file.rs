use super::{COLUMN_COUNT, HEADER, RawRow, RowHandle, SheetStore, check_column, find_in, normalize};
use crate::errors::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Sheet {
    header: Vec<String>,
    rows: Vec<RawRow>,
}

impl Default for Sheet {
    fn default() -> Self {
        Self {
            header: HEADER.iter().map(|name| name.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Document {
    sheets: BTreeMap<String, Sheet>,
}

/// Workbook kept as a JSON document on disk; one named sheet is used.
///
/// The file is re-read on every access so edits made by another
/// process show up on the next load. Writes go through `write_lock`.
pub struct JsonSheetStore {
    path: PathBuf,
    sheet: String,
    write_lock: Mutex<()>,
}

impl JsonSheetStore {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Document, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Document::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Document::default()),
            Err(err) => Err(err.into()),
        }
    }

    async fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(document)?;
        fs::write(&self.path, payload).await?;
        debug!(path = %self.path.display(), "persisted workbook");
        Ok(())
    }

    async fn modify<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Sheet) -> Result<(), StoreError> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        let sheet = document.sheets.entry(self.sheet.clone()).or_default();
        change(sheet)?;
        self.persist(&document).await
    }
}

#[async_trait]
impl SheetStore for JsonSheetStore {
    async fn read_all_rows(&self) -> Result<Vec<RawRow>, StoreError> {
        let mut document = self.read_document().await?;
        Ok(document
            .sheets
            .remove(&self.sheet)
            .map(|sheet| sheet.rows.into_iter().map(normalize).collect())
            .unwrap_or_default())
    }

    async fn append_row(&self, row: RawRow) -> Result<(), StoreError> {
        let row = normalize(row);
        self.modify(move |sheet| {
            sheet.rows.push(row);
            Ok(())
        })
        .await
    }

    async fn find_row_matching(&self, date: &str) -> Result<Option<RowHandle>, StoreError> {
        let rows = self.read_all_rows().await?;
        Ok(find_in(&rows, date))
    }

    async fn update_cell(
        &self,
        row: RowHandle,
        column: usize,
        value: String,
    ) -> Result<(), StoreError> {
        let index = check_column(column)?;
        self.modify(move |sheet| {
            let cells = sheet
                .rows
                .get_mut(row.0)
                .ok_or(StoreError::UnknownRow(row.0))?;
            if cells.len() < COLUMN_COUNT {
                cells.resize(COLUMN_COUNT, String::new());
            }
            cells[index] = value;
            Ok(())
        })
        .await
    }
}
