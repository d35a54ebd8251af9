#![allow(dead_code)]

use tpcc_driver::settings::TpccConfiguration;
use tpcc_driver::storage::BulkSink;
use tpcc_driver::Result;

use config::Config;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

/// Set up configuration for the TPC-C test suite.
pub fn setup_config() -> TpccConfiguration {
    setup_config_with(&[])
}

/// Test configuration with overrides applied on top of the test settings file.
pub fn setup_config_with(overrides: &[(&str, &str)]) -> TpccConfiguration {
    let mut c = Config::default();
    c.merge(config::File::with_name("./tests/Test-tpcc.toml"))
        .unwrap();
    for (key, value) in overrides {
        c.set(key, *value).unwrap();
    }
    TpccConfiguration::from_config(c).unwrap()
}

/// Keeps every inserted line in memory, per table.
#[derive(Default)]
pub struct MemorySink {
    tables: Mutex<HashMap<String, Vec<String>>>,
    truncated: Mutex<Vec<String>>,
    inserts: AtomicU64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self, table: &str) -> Vec<String> {
        self.tables.lock().get(table).cloned().unwrap_or_default()
    }

    pub fn total_lines(&self) -> usize {
        self.tables.lock().values().map(|t| t.len()).sum()
    }

    pub fn truncated(&self) -> Vec<String> {
        self.truncated.lock().clone()
    }

    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }
}

impl BulkSink for MemorySink {
    fn truncate(&self, table: &str) -> Result<()> {
        self.tables.lock().remove(table);
        self.truncated.lock().push(table.to_string());
        Ok(())
    }

    fn insert(&self, table: &str, _columns: &str, rows: &str) -> Result<()> {
        self.inserts.fetch_add(1, Ordering::Relaxed);
        let mut tables = self.tables.lock();
        let lines = tables.entry(table.to_string()).or_insert_with(Vec::new);
        lines.extend(rows.split('\n').map(|l| l.to_string()));
        Ok(())
    }
}

/// Fails every insert into one table.
pub struct FailingSink {
    pub table: &'static str,
    pub inner: MemorySink,
}

impl BulkSink for FailingSink {
    fn truncate(&self, table: &str) -> Result<()> {
        self.inner.truncate(table)
    }

    fn insert(&self, table: &str, columns: &str, rows: &str) -> Result<()> {
        if table == self.table {
            return Err(Box::new(io::Error::new(
                io::ErrorKind::Other,
                format!("insert into {} rejected", table),
            )));
        }
        self.inner.insert(table, columns, rows)
    }
}
