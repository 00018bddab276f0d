//! CSV file ledger.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use domain::SubmittedOrder;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::{AuditLedger, LedgerRecord, LedgerWriteError, Result};

/// Column header, written once to a new or empty file.
pub const HEADER: &str = "order_number,timestamp,category,product,quantity,unit_price,total_price";

/// Ledger backed by a UTF-8 CSV file opened in append mode.
///
/// Each `append` writes all rows of the order with a single write on an
/// `O_APPEND` handle and syncs it to disk. A failed write is truncated
/// away, and a partial last row left by an earlier crash is terminated
/// before new rows are added. Appends from this process are
/// serialized so the header check and the row write cannot interleave.
#[derive(Debug)]
pub struct CsvLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvLedger {
    /// Creates a ledger writing to `path`. The file is created on first append;
    /// its parent directory must already exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> LedgerWriteError {
        LedgerWriteError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl AuditLedger for CsvLedger {
    #[tracing::instrument(skip(self, order), fields(path = %self.path.display(), order_number = %order.order_number()))]
    async fn append(&self, order: &SubmittedOrder) -> Result<usize> {
        let records = LedgerRecord::for_order(order);
        if records.is_empty() {
            return Ok(0);
        }

        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        let start_len = file.metadata().await.map_err(|e| self.io_error(e))?.len();
        let is_empty = start_len == 0;

        let mut buf = String::new();
        if is_empty {
            buf.push_str(HEADER);
            buf.push_str("\r\n");
        } else if !ends_with_newline(&mut file).await.map_err(|e| self.io_error(e))? {
            tracing::warn!("ledger ends in a partial row, starting a new line");
            buf.push_str("\r\n");
        }
        for record in &records {
            write_row(&mut buf, record);
        }

        if let Err(e) = write_and_sync(&mut file, buf.as_bytes()).await {
            if let Err(truncate_err) = file.set_len(start_len).await {
                tracing::warn!(error = %truncate_err, "could not remove partial ledger write");
            }
            return Err(self.io_error(e));
        }

        tracing::debug!(rows = records.len(), header = is_empty, "ledger rows appended");
        Ok(records.len())
    }
}

async fn write_and_sync(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_data().await
}

async fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    file.seek(SeekFrom::End(-1)).await?;
    Ok(file.read_u8().await? == b'\n')
}

fn write_row(buf: &mut String, record: &LedgerRecord) {
    let fields: [&str; 7] = [
        record.order_number.as_str(),
        record.timestamp.as_str(),
        record.category.as_str(),
        record.product.as_str(),
        &record.quantity.to_string(),
        &record.unit_price.to_string(),
        &record.total_price.to_string(),
    ];

    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }
        push_field(buf, field);
    }
    buf.push_str("\r\n");
}

/// Quotes a field if it contains a delimiter, quote or line break.
fn push_field(buf: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        buf.push('"');
        buf.push_str(&field.replace('"', "\"\""));
        buf.push('"');
    } else {
        buf.push_str(field);
    }
}
