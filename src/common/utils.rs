use crate::common::error::FatalError;
use crate::common::message::{Outcome, Transaction};
use crate::common::parameter_generation::Generator;
use crate::common::statistics::Statistics;
use crate::settings::TpccConfiguration;
use crate::workloads::tpcc::generator::TpccGenerator;
use crate::workloads::tpcc::procedures::{execute, TpccProcedures};
use crate::Result;

use crossbeam_utils::thread;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::Level;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::FmtSubscriber;

/// Longest a reporter sleeps before checking the stop flag.
const POLL: Duration = Duration::from_millis(50);

/// Install the global subscriber.
///
/// With `log_dir` set, logs go to an hourly rolling file; the returned guard must outlive
/// logging or buffered lines are lost.
pub fn set_log_level(config: &TpccConfiguration) -> Result<Option<WorkerGuard>> {
    let level = match config.log.as_str() {
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::WARN,
    };

    match &config.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::hourly(dir, "tpcc.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_thread_names(true)
                .with_target(false)
                .with_writer(non_blocking)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;

            Ok(Some(guard))
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_thread_names(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;

            Ok(None)
        }
    }
}

/// Worker loop: generate, execute and record transactions until `stop` is set.
///
/// The flag is checked before each transaction so an in-flight transaction always completes.
/// Returns the number of transactions executed.
pub fn run<P: TpccProcedures + ?Sized>(
    thread_id: usize,
    config: &TpccConfiguration,
    stats: &Statistics,
    stop: &AtomicBool,
    procedures: &mut P,
) -> u64 {
    let mut generator = TpccGenerator::new(thread_id, config);
    debug!("Worker {} started", thread_id);

    while !stop.load(Ordering::Relaxed) {
        let profile = generator.generate();
        let transaction = Transaction::Tpcc(profile.transaction());

        let outcome = Outcome::from_result(execute(procedures, &profile));
        match &outcome {
            Outcome::Committed => {}
            Outcome::Aborted(e) => {
                debug!("{} {} aborted: {}", transaction_name(transaction), profile, e)
            }
            Outcome::Failed(e) => {
                warn!("{} {} failed: {}", transaction_name(transaction), profile, e)
            }
        }

        stats.record(transaction, &outcome);
    }

    let completed = generator.get_generated();
    debug!("Worker {} stopped after {} transactions", thread_id, completed);
    completed
}

fn transaction_name(transaction: Transaction) -> String {
    match transaction {
        Transaction::Tpcc(t) => t.to_string(),
    }
}

/// Run the benchmark phase.
///
/// Spawns `benchmark_threads` workers, each owning the procedures built by `make_procedures`,
/// and a reporter that hands `Statistics::render` output to `report` every `report_interval`.
/// After `benchmark_duration` the stop flag is set and all threads are joined.
///
/// Returns the elapsed runtime.
pub fn run_benchmark<P, F, R>(
    config: &TpccConfiguration,
    stats: &Statistics,
    make_procedures: F,
    mut report: R,
) -> Result<Duration>
where
    P: TpccProcedures,
    F: Fn(usize) -> P + Sync,
    R: FnMut(String) + Send,
{
    let threads = config.benchmark_threads;
    let core_ids = if config.pin_threads {
        core_affinity::get_core_ids().unwrap_or_default()
    } else {
        Vec::new()
    };

    let stop = AtomicBool::new(false);
    let start = Instant::now();
    info!(
        "Starting benchmark: {} threads for {:?}",
        threads, config.benchmark_duration
    );

    let res = thread::scope(|s| -> Result<()> {
        let stop = &stop;
        let make_procedures = &make_procedures;

        for thread_id in 0..threads {
            let core_id = if core_ids.is_empty() {
                None
            } else {
                Some(core_ids[thread_id % core_ids.len()])
            };

            let spawned = s
                .builder()
                .name(format!("worker-{}", thread_id))
                .spawn(move |_| {
                    if let Some(core_id) = core_id {
                        core_affinity::set_for_current(core_id);
                    }
                    let mut procedures = make_procedures(thread_id);
                    run(thread_id, config, stats, stop, &mut procedures)
                });

            // workers already running must be told to exit before the scope joins them
            if let Err(e) = spawned {
                stop.store(true, Ordering::Relaxed);
                return Err(e.into());
            }
        }

        let report = &mut report;
        let spawned = s
            .builder()
            .name("reporter".to_string())
            .spawn(move |_| {
                let mut next = config.report_interval;
                while !stop.load(Ordering::Relaxed) {
                    let elapsed = start.elapsed();
                    if elapsed >= next {
                        report(stats.render(elapsed, config));
                        next += config.report_interval;
                    } else {
                        std::thread::sleep((next - elapsed).min(POLL));
                    }
                }
            });
        if let Err(e) = spawned {
            stop.store(true, Ordering::Relaxed);
            return Err(e.into());
        }

        std::thread::sleep(config.benchmark_duration);
        info!("Stopping workers");
        stop.store(true, Ordering::Relaxed);
        Ok(())
    });

    let runtime = start.elapsed();
    match res {
        Ok(spawned) => spawned?,
        Err(_) => return Err(Box::new(FatalError::WorkerPanicked)),
    }

    info!("Benchmark finished after {:?}", runtime);
    Ok(runtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::NonFatalError;
    use crate::workloads::tpcc::procedures::DryRunProcedures;
    use crate::workloads::tpcc::profiles::*;

    struct Flaky {
        calls: u64,
    }

    impl Flaky {
        fn next(&mut self) -> std::result::Result<(), NonFatalError> {
            self.calls += 1;
            match self.calls % 3 {
                0 => Err(NonFatalError::LockNotAvailable("55P03".to_string())),
                1 => Err(NonFatalError::Unexpected("connection reset".to_string())),
                _ => Ok(()),
            }
        }
    }

    impl TpccProcedures for Flaky {
        fn new_order(&mut self, _: &NewOrder) -> std::result::Result<(), NonFatalError> {
            self.next()
        }

        fn payment(&mut self, _: &Payment) -> std::result::Result<(), NonFatalError> {
            self.next()
        }

        fn order_status(&mut self, _: &OrderStatus) -> std::result::Result<(), NonFatalError> {
            self.next()
        }

        fn delivery(&mut self, _: &Delivery) -> std::result::Result<(), NonFatalError> {
            self.next()
        }

        fn stock_level(&mut self, _: &StockLevel) -> std::result::Result<(), NonFatalError> {
            self.next()
        }
    }

    fn config() -> TpccConfiguration {
        TpccConfiguration {
            benchmark_threads: 2,
            benchmark_duration: Duration::from_millis(200),
            report_interval: Duration::from_millis(50),
            warehouses: 2,
            customers_per_district: 30,
            item_count: 100,
            set_seed: true,
            ..Default::default()
        }
    }

    #[test]
    fn stopped_worker_does_nothing() {
        let stats = Statistics::new();
        let stop = AtomicBool::new(true);
        let mut p = DryRunProcedures::default();
        assert_eq!(run(0, &config(), &stats, &stop, &mut p), 0);
        assert_eq!(stats.get_total(), 0);
    }

    #[test]
    fn run_benchmark_records_outcomes() {
        let stats = Statistics::new();
        let mut reports = Vec::new();
        let runtime = run_benchmark(
            &config(),
            &stats,
            |_| Flaky { calls: 0 },
            |r| reports.push(r),
        )
        .unwrap();

        assert!(runtime >= Duration::from_millis(200));
        assert!(!reports.is_empty());
        assert!(reports[0].starts_with("Num threads:    2\n"));

        let s = stats.snapshot();
        assert!(s.aborted > 0);
        assert!(s.failed > 0);
        assert!(s.successful() > 0);
        assert_eq!(s.total(), s.successful() + s.aborted + s.failed);
    }
}
