//! Storage collaborator used by the load phase.
use crate::common::error::FatalError;
use crate::workloads::tpcc::TABLES;
use crate::Result;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Bulk insert interface.
///
/// `rows` is column-ordered, quoted text; lines are separated by `\n`.
pub trait BulkSink: Send + Sync {
    /// Remove all rows of a table.
    fn truncate(&self, table: &str) -> Result<()>;

    /// Insert one batch of rows.
    fn insert(&self, table: &str, columns: &str, rows: &str) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

type Writer = Arc<Mutex<BufWriter<File>>>;

/// Writes each table to `<dir>/<table>.csv` with a header line.
#[derive(Debug)]
pub struct CsvSink {
    dir: PathBuf,
    writers: Mutex<HashMap<String, Writer>>,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(CsvSink {
            dir,
            writers: Mutex::new(HashMap::new()),
        })
    }

    pub fn path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", table))
    }

    fn check(table: &str) -> Result<()> {
        if TABLES.contains(&table) {
            Ok(())
        } else {
            Err(Box::new(FatalError::UnknownTable(table.to_string())))
        }
    }

    fn writer(&self, table: &str, columns: &str) -> Result<Writer> {
        let mut writers = self.writers.lock();
        if let Some(w) = writers.get(table) {
            return Ok(Arc::clone(w));
        }

        let path = self.path(table);
        let new = !path.exists() || fs::metadata(&path)?.len() == 0;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut w = BufWriter::new(file);
        if new {
            writeln!(w, "{}", columns)?;
        }
        debug!("Opened {}", path.display());

        let w = Arc::new(Mutex::new(w));
        writers.insert(table.to_string(), Arc::clone(&w));
        Ok(w)
    }
}

impl BulkSink for CsvSink {
    fn truncate(&self, table: &str) -> Result<()> {
        Self::check(table)?;
        let mut writers = self.writers.lock();
        writers.remove(table);
        let path = self.path(table);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn insert(&self, table: &str, columns: &str, rows: &str) -> Result<()> {
        Self::check(table)?;
        let w = self.writer(table, columns)?;
        let mut w = w.lock();
        w.write_all(rows.as_bytes())?;
        w.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        for w in self.writers.lock().values() {
            w.lock().flush()?;
        }
        Ok(())
    }
}
