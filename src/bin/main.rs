use tpcc_driver::common::statistics::Statistics;
use tpcc_driver::common::utils;
use tpcc_driver::settings::{self, TpccConfiguration};
use tpcc_driver::storage::CsvSink;
use tpcc_driver::workloads::tpcc::loader;
use tpcc_driver::workloads::tpcc::procedures::DryRunProcedures;

use clap::{arg, Arg, ArgAction, Command};
use std::io::{self, Write};
use std::time::Duration;
use tracing::info;

fn main() -> tpcc_driver::Result<()> {
    // command line
    let matches = Command::new("tpcc")
        .version("0.1.0")
        .about("TPC-C benchmark driver")
        .arg(arg!(-c --config <FILE> "Settings file").required(false))
        .arg(arg!(-t --threads <THREADS> "Benchmark threads").required(false))
        .arg(arg!(-d --duration <DURATION> "Benchmark duration, e.g. 300s or 5m").required(false))
        .arg(arg!(-w --warehouses <WAREHOUSES> "Number of warehouses").required(false))
        .arg(arg!(-l --log <LOG> "Log level").required(false))
        .arg(
            Arg::new("skip-load")
                .long("skip-load")
                .help("Skip the load phase")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("skip-benchmark")
                .long("skip-benchmark")
                .help("Skip the benchmark phase")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    // config file, then environment
    let file = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("Settings.toml");
    let mut config = settings::init_config(file)?;

    if let Some(t) = matches.get_one::<String>("threads") {
        config.set("benchmark_threads", t.clone())?;
    }

    if let Some(d) = matches.get_one::<String>("duration") {
        config.set("benchmark_duration", d.clone())?;
    }

    if let Some(w) = matches.get_one::<String>("warehouses") {
        config.set("warehouses", w.clone())?;
    }

    if let Some(l) = matches.get_one::<String>("log") {
        config.set("log", l.clone())?;
    }

    if matches.get_one::<bool>("skip-load").copied().unwrap_or(false) {
        config.set("load_data", false)?;
    }

    if matches.get_one::<bool>("skip-benchmark").copied().unwrap_or(false) {
        config.set("run_benchmark", false)?;
    }

    let config = TpccConfiguration::from_config(config)?;

    // logging
    let _guard = utils::set_log_level(&config)?;
    info!("{:?}", config);

    if config.load_data {
        let sink = CsvSink::new(&config.data_dir)?;
        let summary = loader::populate_tables(&config, &sink)?;
        println!(
            "Loaded {} rows ({} lines) in {:?}",
            summary.rows, summary.lines, summary.elapsed
        );
    }

    if config.run_benchmark {
        let stats = Statistics::new();
        let latency = Duration::from_micros(config.simulated_latency_us);

        let runtime = utils::run_benchmark(
            &config,
            &stats,
            |_| DryRunProcedures::new(latency),
            |report| {
                let mut stdout = io::stdout();
                let _ = write!(stdout, "\x1b[2J\x1b[1;1H{}", report);
                let _ = stdout.flush();
            },
        )?;

        print!("\x1b[2J\x1b[1;1H{}", stats.render(runtime, &config));
        info!("{}", stats.summary(runtime));
    }

    Ok(())
}
