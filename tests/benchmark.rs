use tpcc_driver::common::error::NonFatalError;
use tpcc_driver::common::statistics::Statistics;
use tpcc_driver::common::utils;
use tpcc_driver::workloads::tpcc::procedures::{DryRunProcedures, TpccProcedures};
use tpcc_driver::workloads::tpcc::profiles::*;

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use test_env_log::test;

mod common;

/// Aborts every payment, fails every delivery, commits the rest.
struct Scripted<'a> {
    calls: &'a AtomicU64,
    threads: &'a Mutex<HashSet<String>>,
}

impl<'a> Scripted<'a> {
    fn call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let name = thread::current().name().unwrap_or_default().to_string();
        self.threads.lock().insert(name);
    }
}

impl<'a> TpccProcedures for Scripted<'a> {
    fn new_order(&mut self, _: &NewOrder) -> Result<(), NonFatalError> {
        self.call();
        Ok(())
    }

    fn payment(&mut self, _: &Payment) -> Result<(), NonFatalError> {
        self.call();
        Err(NonFatalError::SerializationFailure("40001".to_string()))
    }

    fn order_status(&mut self, _: &OrderStatus) -> Result<(), NonFatalError> {
        self.call();
        Ok(())
    }

    fn delivery(&mut self, params: &Delivery) -> Result<(), NonFatalError> {
        self.call();
        Err(NonFatalError::RowNotFound(
            params.w_id.to_string(),
            "warehouse".to_string(),
        ))
    }

    fn stock_level(&mut self, _: &StockLevel) -> Result<(), NonFatalError> {
        self.call();
        thread::sleep(Duration::from_micros(100));
        Ok(())
    }
}

#[test]
fn dry_run_benchmark() {
    let config = common::setup_config();
    let stats = Statistics::new();
    let mut reports = Vec::new();

    let runtime = utils::run_benchmark(
        &config,
        &stats,
        |_| DryRunProcedures::new(Duration::from_micros(50)),
        |report| reports.push(report),
    )
    .unwrap();

    assert!(runtime >= Duration::from_millis(300));
    assert!(!reports.is_empty());
    for report in &reports {
        assert!(report.starts_with("Num threads:    4\n"));
        assert!(report.contains("Aborted:        0 (0.0% - 0.00/s)\n"));
    }

    let s = stats.snapshot();
    assert!(s.new_order > 0);
    assert!(s.payment > 0);
    assert_eq!(s.aborted, 0);
    assert_eq!(s.failed, 0);
    assert_eq!(stats.get_total(), stats.get_successful());
}

#[test]
fn outcomes_are_classified() {
    let config = common::setup_config_with(&[
        ("new_order_weight", "1"),
        ("payment_weight", "1"),
        ("order_status_weight", "1"),
        ("delivery_weight", "1"),
        ("stock_level_weight", "1"),
    ]);
    let stats = Statistics::new();
    let calls = AtomicU64::new(0);
    let threads = Mutex::new(HashSet::new());

    utils::run_benchmark(
        &config,
        &stats,
        |_| Scripted {
            calls: &calls,
            threads: &threads,
        },
        |_| {},
    )
    .unwrap();

    let s = stats.snapshot();
    assert_eq!(s.payment, 0);
    assert_eq!(s.delivery, 0);
    assert!(s.aborted > 0);
    assert!(s.failed > 0);
    assert!(s.new_order > 0 && s.order_status > 0 && s.stock_level > 0);

    // every executed transaction was recorded exactly once
    assert_eq!(s.total(), calls.load(Ordering::Relaxed));
    assert_eq!(threads.lock().len(), config.benchmark_threads);
}

#[test]
fn report_is_called_per_interval() {
    let config = common::setup_config_with(&[
        ("benchmark_duration", "550ms"),
        ("report_interval", "100ms"),
        ("benchmark_threads", "1"),
    ]);
    let stats = Statistics::new();
    let mut reports = 0;

    utils::run_benchmark(
        &config,
        &stats,
        |_| DryRunProcedures::new(Duration::from_millis(1)),
        |_| reports += 1,
    )
    .unwrap();

    assert!(reports >= 3 && reports <= 6, "{} reports", reports);
}
