//! Benchmark statistics shared by all worker threads.
//!
//! Each counter is an independent atomic; workers increment, the reporter reads. There is no
//! cross-counter atomicity, a render may observe one counter before and another after an increment.
use crate::common::message::{Outcome, Transaction};
use crate::settings::TpccConfiguration;
use crate::workloads::tpcc::TpccTransaction;

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters of one benchmark run; never reset.
#[derive(Debug, Default)]
pub struct Statistics {
    new_order: AtomicU64,
    payment: AtomicU64,
    order_status: AtomicU64,
    delivery: AtomicU64,
    stock_level: AtomicU64,
    aborted: AtomicU64,
    failed: AtomicU64,
}

/// Counter values read at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub new_order: u64,
    pub payment: u64,
    pub order_status: u64,
    pub delivery: u64,
    pub stock_level: u64,
    pub aborted: u64,
    pub failed: u64,
}

impl Snapshot {
    pub fn successful(&self) -> u64 {
        self.new_order + self.payment + self.order_status + self.delivery + self.stock_level
    }

    pub fn total(&self) -> u64 {
        self.successful() + self.aborted + self.failed
    }
}

/// Events per whole elapsed second; 0 before the first second has passed.
pub fn rate(count: u64, runtime: Duration) -> f64 {
    match runtime.as_secs() {
        0 => 0.0,
        secs => count as f64 / secs as f64,
    }
}

/// Share of `total` in percent; 0 when `total` is 0.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_new_order(&self) {
        self.new_order.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_new_order(&self) -> u64 {
        self.new_order.load(Ordering::Relaxed)
    }

    pub fn inc_payment(&self) {
        self.payment.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_payment(&self) -> u64 {
        self.payment.load(Ordering::Relaxed)
    }

    pub fn inc_order_status(&self) {
        self.order_status.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_order_status(&self) -> u64 {
        self.order_status.load(Ordering::Relaxed)
    }

    pub fn inc_delivery(&self) {
        self.delivery.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_delivery(&self) -> u64 {
        self.delivery.load(Ordering::Relaxed)
    }

    pub fn inc_stock_level(&self) {
        self.stock_level.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stock_level(&self) -> u64 {
        self.stock_level.load(Ordering::Relaxed)
    }

    pub fn inc_aborted(&self) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_aborted(&self) -> u64 {
        self.aborted.load(Ordering::Relaxed)
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn get_successful(&self) -> u64 {
        self.snapshot().successful()
    }

    pub fn get_total(&self) -> u64 {
        self.snapshot().total()
    }

    /// Record the outcome of one transaction.
    pub fn record(&self, transaction: Transaction, outcome: &Outcome) {
        match outcome {
            Outcome::Committed => match transaction {
                Transaction::Tpcc(TpccTransaction::NewOrder) => self.inc_new_order(),
                Transaction::Tpcc(TpccTransaction::Payment) => self.inc_payment(),
                Transaction::Tpcc(TpccTransaction::OrderStatus) => self.inc_order_status(),
                Transaction::Tpcc(TpccTransaction::Delivery) => self.inc_delivery(),
                Transaction::Tpcc(TpccTransaction::StockLevel) => self.inc_stock_level(),
            },
            Outcome::Aborted(_) => self.inc_aborted(),
            Outcome::Failed(_) => self.inc_failed(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            new_order: self.get_new_order(),
            payment: self.get_payment(),
            order_status: self.get_order_status(),
            delivery: self.get_delivery(),
            stock_level: self.get_stock_level(),
            aborted: self.get_aborted(),
            failed: self.get_failed(),
        }
    }

    /// Human-readable report of the current counters.
    pub fn render(&self, runtime: Duration, config: &TpccConfiguration) -> String {
        let s = self.snapshot();
        let total = s.total();
        let mut out = String::new();

        // writing to a String cannot fail
        let _ = writeln!(out, "Num threads:    {}", config.benchmark_threads);
        let _ = writeln!(out, "Duration:       {:?}", Duration::from_secs(runtime.as_secs()));
        let _ = writeln!(out, "Read-only tx:   {}", config.use_read_only_transactions);
        let _ = writeln!(out, "Exclusive lock: {}", config.lock_scanned_ranges);
        let _ = writeln!(out);

        let counters = [
            ("New orders:     ", s.new_order),
            ("Payments:       ", s.payment),
            ("Order status:   ", s.order_status),
            ("Delivery:       ", s.delivery),
            ("Stock level:    ", s.stock_level),
        ];
        for (label, count) in counters.iter() {
            let _ = writeln!(out, "{}{} ({:.2}/s)", label, count, rate(*count, runtime));
        }
        let _ = writeln!(out);

        let outcomes = [
            ("Aborted:        ", s.aborted),
            ("Failed:         ", s.failed),
            ("Successful:     ", s.successful()),
        ];
        for (label, count) in outcomes.iter() {
            let _ = writeln!(
                out,
                "{}{} ({:.1}% - {:.2}/s)",
                label,
                count,
                percentage(*count, total),
                rate(*count, runtime)
            );
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "Total:          {} ({:.2}/s)", total, rate(total, runtime));
        out
    }

    /// Machine-readable summary for the end of a run.
    pub fn summary(&self, runtime: Duration) -> Value {
        let s = self.snapshot();
        let total = s.total();
        json!({
            "runtime (s)": runtime.as_secs(),
            "counters": s,
            "successful": s.successful(),
            "total": total,
            "abort_rate": format!("{:.2}", percentage(s.aborted, total)),
            "failure_rate": format!("{:.2}", percentage(s.failed, total)),
            "thpt": format!("{:.2}", rate(s.successful(), runtime)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::NonFatalError;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_increments_are_not_lost() {
        let stats = Arc::new(Statistics::new());
        let mut handles = vec![];
        for _ in 0..4 {
            let stats = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..10_000 {
                    stats.inc_new_order();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(stats.get_new_order(), 40_000);
        assert_eq!(stats.get_total(), 40_000);
    }

    #[test]
    fn totals_are_sums() {
        let stats = Statistics::new();
        stats.inc_new_order();
        stats.inc_payment();
        stats.inc_payment();
        stats.inc_order_status();
        stats.inc_delivery();
        stats.inc_stock_level();
        stats.inc_aborted();
        stats.inc_failed();
        stats.inc_failed();

        assert_eq!(stats.get_successful(), 6);
        assert_eq!(stats.get_total(), 9);
        let s = stats.snapshot();
        assert_eq!(
            s.total(),
            s.new_order + s.payment + s.order_status + s.delivery + s.stock_level + s.aborted + s.failed
        );
    }

    #[test]
    fn record_routes_outcomes() {
        let stats = Statistics::new();
        stats.record(Transaction::Tpcc(TpccTransaction::Delivery), &Outcome::Committed);
        stats.record(
            Transaction::Tpcc(TpccTransaction::NewOrder),
            &Outcome::Aborted(NonFatalError::Deadlock("40P01".to_string())),
        );
        stats.record(
            Transaction::Tpcc(TpccTransaction::NewOrder),
            &Outcome::Failed(NonFatalError::Unexpected("eof".to_string())),
        );
        assert_eq!(stats.get_delivery(), 1);
        assert_eq!(stats.get_new_order(), 0);
        assert_eq!(stats.get_aborted(), 1);
        assert_eq!(stats.get_failed(), 1);
    }

    #[test]
    fn rate_and_percentage_edge_cases() {
        assert_eq!(rate(10, Duration::from_millis(999)), 0.0);
        assert_eq!(rate(10, Duration::from_secs(0)), 0.0);
        assert_eq!(rate(10, Duration::from_millis(2500)), 5.0);
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(4, 4), 100.0);
    }

    #[test]
    fn render_empty() {
        let stats = Statistics::new();
        let config = TpccConfiguration {
            benchmark_threads: 4,
            ..Default::default()
        };
        let report = stats.render(Duration::from_secs(0), &config);
        let expected = "\
Num threads:    4
Duration:       0ns
Read-only tx:   false
Exclusive lock: false

New orders:     0 (0.00/s)
Payments:       0 (0.00/s)
Order status:   0 (0.00/s)
Delivery:       0 (0.00/s)
Stock level:    0 (0.00/s)

Aborted:        0 (0.0% - 0.00/s)
Failed:         0 (0.0% - 0.00/s)
Successful:     0 (0.0% - 0.00/s)

Total:          0 (0.00/s)
";
        assert_eq!(report, expected);
    }

    #[test]
    fn render_counts() {
        let stats = Statistics::new();
        for _ in 0..6 {
            stats.inc_new_order();
        }
        stats.inc_payment();
        stats.inc_aborted();
        stats.inc_failed();
        stats.inc_failed();
        let config = TpccConfiguration {
            benchmark_threads: 2,
            use_read_only_transactions: true,
            ..Default::default()
        };

        let report = stats.render(Duration::from_millis(2400), &config);
        assert!(report.contains("Duration:       2s\n"));
        assert!(report.contains("Read-only tx:   true\n"));
        assert!(report.contains("New orders:     6 (3.00/s)\n"));
        assert!(report.contains("Aborted:        1 (10.0% - 0.50/s)\n"));
        assert!(report.contains("Failed:         2 (20.0% - 1.00/s)\n"));
        assert!(report.contains("Successful:     7 (70.0% - 3.50/s)\n"));
        assert!(report.contains("Total:          10 (5.00/s)\n"));
    }

    #[test]
    fn summary_fields() {
        let stats = Statistics::new();
        stats.inc_stock_level();
        stats.inc_aborted();
        let v = stats.summary(Duration::from_secs(1));
        assert_eq!(v["total"], 2);
        assert_eq!(v["counters"]["stock_level"], 1);
        assert_eq!(v["abort_rate"], "50.00");
    }
}
