use crate::common::error::FatalError;

use config::{Config, Environment, File};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::thread;
use std::time::Duration;

/// Benchmark configuration; immutable once a run starts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TpccConfiguration {
    pub load_data: bool,
    pub truncate_before_load: bool,
    pub run_benchmark: bool,
    pub benchmark_threads: usize,
    #[serde(deserialize_with = "deserialize_duration")]
    pub benchmark_duration: Duration,
    pub warehouses: u64,
    pub districts_per_warehouse: u64,
    pub customers_per_district: u64,
    pub item_count: u64,

    /// Execute read-only transaction types in read-only transactions.
    pub use_read_only_transactions: bool,

    /// Take exclusive locks on scanned ranges.
    pub lock_scanned_ranges: bool,

    #[serde(deserialize_with = "deserialize_duration")]
    pub report_interval: Duration,
    pub load_threads: Option<usize>,
    pub load_batch_size: u64,
    pub data_dir: String,
    pub show_progress: bool,
    pub pin_threads: bool,
    pub set_seed: bool,
    pub seed: u64,

    pub new_order_weight: u32,
    pub payment_weight: u32,
    pub order_status_weight: u32,
    pub delivery_weight: u32,
    pub stock_level_weight: u32,

    /// Latency of the dry-run executor (microseconds).
    pub simulated_latency_us: u64,

    pub log: String,
    pub log_dir: Option<String>,
}

impl Default for TpccConfiguration {
    fn default() -> Self {
        TpccConfiguration {
            load_data: true,
            truncate_before_load: false,
            run_benchmark: true,
            benchmark_threads: 8,
            benchmark_duration: Duration::from_secs(60),
            warehouses: 10,
            districts_per_warehouse: 10,
            customers_per_district: 3000,
            item_count: 100_000,
            use_read_only_transactions: false,
            lock_scanned_ranges: false,
            report_interval: Duration::from_secs(1),
            load_threads: None,
            load_batch_size: 1000,
            data_dir: "./data".to_string(),
            show_progress: true,
            pin_threads: false,
            set_seed: false,
            seed: 42,
            new_order_weight: 45,
            payment_weight: 43,
            order_status_weight: 4,
            delivery_weight: 4,
            stock_level_weight: 4,
            simulated_latency_us: 0,
            log: "warn".to_string(),
            log_dir: None,
        }
    }
}

impl TpccConfiguration {
    /// Deserialize and validate a layered configuration.
    pub fn from_config(config: Config) -> crate::Result<Self> {
        let tpcc: TpccConfiguration = config.try_into()?;
        tpcc.validate()?;
        Ok(tpcc)
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), FatalError> {
        let positive = [
            ("warehouses", self.warehouses),
            ("districts_per_warehouse", self.districts_per_warehouse),
            ("customers_per_district", self.customers_per_district),
            ("item_count", self.item_count),
            ("load_batch_size", self.load_batch_size),
            ("benchmark_threads", self.benchmark_threads as u64),
        ];
        for (name, value) in positive.iter() {
            if *value == 0 {
                return Err(FatalError::InvalidConfiguration(format!(
                    "{} must be > 0",
                    name
                )));
            }
        }

        if self.item_count > i64::MAX as u64 {
            return Err(FatalError::InvalidConfiguration(format!(
                "item_count {} out of range",
                self.item_count
            )));
        }

        if self.load_threads == Some(0) {
            return Err(FatalError::InvalidConfiguration(
                "load_threads must be > 0".to_string(),
            ));
        }

        if self.benchmark_duration == Duration::from_secs(0) {
            return Err(FatalError::InvalidConfiguration(
                "benchmark_duration must be > 0".to_string(),
            ));
        }

        if self.report_interval == Duration::from_secs(0) {
            return Err(FatalError::InvalidConfiguration(
                "report_interval must be > 0".to_string(),
            ));
        }

        if self.weights().iter().all(|w| *w == 0) {
            return Err(FatalError::InvalidConfiguration(
                "at least one transaction weight must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Mix weights in `TpccTransaction` order.
    pub fn weights(&self) -> [u32; 5] {
        [
            self.new_order_weight,
            self.payment_weight,
            self.order_status_weight,
            self.delivery_weight,
            self.stock_level_weight,
        ]
    }

    /// Threads used to generate rows during the load phase.
    pub fn load_parallelism(&self) -> usize {
        match self.load_threads {
            Some(n) => n,
            None => thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Layer the settings file, then `TPCC_` environment variables.
pub fn init_config(file: &str) -> crate::Result<Config> {
    let mut settings = Config::default();
    settings.merge(File::with_name(file).required(false))?;
    settings.merge(Environment::with_prefix("TPCC"))?;
    Ok(settings)
}

/// Parse a duration string like "1h", "30m", "300s", "250ms" or "300".
///
/// Plain numbers are seconds.
pub fn parse_duration(s: &str) -> Result<Duration, FatalError> {
    let s = s.trim();
    let invalid = || FatalError::InvalidDuration(s.to_string());

    if s.is_empty() {
        return Err(invalid());
    }

    let (num, unit) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3_600_000)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60_000)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1000)
    } else {
        (s, 1000)
    };

    let value: u64 = num.trim().parse().map_err(|_| invalid())?;
    let millis = value.checked_mul(unit).ok_or_else(invalid)?;
    Ok(Duration::from_millis(millis))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DurationValue {
    Seconds(u64),
    Text(String),
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match DurationValue::deserialize(deserializer)? {
        DurationValue::Seconds(secs) => Ok(Duration::from_secs(secs)),
        DurationValue::Text(s) => parse_duration(&s).map_err(de::Error::custom),
    }
}
