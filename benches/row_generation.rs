use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tpcc_driver::settings::TpccConfiguration;
use tpcc_driver::storage::BulkSink;
use tpcc_driver::workloads::tpcc::loader::{self, CustomerProducer, OrderLineProducer};
use tpcc_driver::workloads::tpcc::producer::RowProducer;
use tpcc_driver::Result;

/// Discards every row.
struct NullSink;

impl BulkSink for NullSink {
    fn truncate(&self, _table: &str) -> Result<()> {
        Ok(())
    }

    fn insert(&self, _table: &str, _columns: &str, rows: &str) -> Result<()> {
        black_box(rows);
        Ok(())
    }
}

fn produce<P: RowProducer>(producer: &P) -> usize {
    (0..producer.row_count())
        .map(|row_index| producer.create_row(row_index).len())
        .sum()
}

fn criterion_benchmark(c: &mut Criterion) {
    let order_lines = OrderLineProducer::new(0, 0, 100_000, 3000).unwrap();
    let customers = CustomerProducer::new(0, 0, 3000).unwrap();

    let mut group = c.benchmark_group("row-generation");
    group.sample_size(10);
    group.bench_function("order_line-3000", |b| b.iter(|| produce(&order_lines)));
    group.bench_function("customer-3000", |b| b.iter(|| produce(&customers)));
    group.finish();

    let config = TpccConfiguration {
        warehouses: 1,
        item_count: 10_000,
        customers_per_district: 300,
        load_threads: Some(4),
        show_progress: false,
        ..Default::default()
    };

    let mut group = c.benchmark_group("load");
    group.sample_size(10);
    group.bench_function("1-warehouse", |b| {
        b.iter(|| loader::populate_tables(&config, &NullSink).unwrap())
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
