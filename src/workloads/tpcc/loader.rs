use crate::common::error::FatalError;
use crate::settings::TpccConfiguration;
use crate::storage::BulkSink;
use crate::workloads::tpcc::helper;
use crate::workloads::tpcc::producer::{OrderedIdRowProducer, RowProducer, TpccProducer};
use crate::workloads::tpcc::TABLES;
use crate::{Result, TpccError};

use crossbeam_utils::thread;
use parking_lot::Mutex;
use pbr::ProgressBar;
use rand::Rng;
use std::io::Stdout;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

//////////////////////////////
/// Row Producers. ///
//////////////////////////////

const WAREHOUSE_COLUMNS: &[&str] = &[
    "w_id",
    "w_name",
    "w_street_1",
    "w_street_2",
    "w_city",
    "w_state",
    "w_zip",
    "w_tax",
    "w_ytd",
];

const ITEM_COLUMNS: &[&str] = &["i_id", "i_im_id", "i_name", "i_price", "i_data"];

const STOCK_COLUMNS: &[&str] = &[
    "s_i_id",
    "s_w_id",
    "s_quantity",
    "s_dist_01",
    "s_dist_02",
    "s_dist_03",
    "s_dist_04",
    "s_dist_05",
    "s_dist_06",
    "s_dist_07",
    "s_dist_08",
    "s_dist_09",
    "s_dist_10",
    "s_ytd",
    "s_order_cnt",
    "s_remote_cnt",
    "s_data",
];

const DISTRICT_COLUMNS: &[&str] = &[
    "d_id",
    "d_w_id",
    "d_name",
    "d_street_1",
    "d_street_2",
    "d_city",
    "d_state",
    "d_zip",
    "d_tax",
    "d_ytd",
    "d_next_o_id",
];

const CUSTOMER_COLUMNS: &[&str] = &[
    "c_id",
    "c_d_id",
    "c_w_id",
    "c_first",
    "c_middle",
    "c_last",
    "c_street_1",
    "c_street_2",
    "c_city",
    "c_state",
    "c_zip",
    "c_phone",
    "c_since",
    "c_credit",
    "c_credit_lim",
    "c_discount",
    "c_balance",
    "c_ytd_payment",
    "c_payment_cnt",
    "c_delivery_cnt",
    "c_data",
];

const HISTORY_COLUMNS: &[&str] = &[
    "h_c_id", "h_c_d_id", "h_c_w_id", "h_d_id", "h_w_id", "h_date", "h_amount", "h_data",
];

const ORDER_COLUMNS: &[&str] = &[
    "o_id",
    "o_d_id",
    "o_w_id",
    "o_c_id",
    "o_entry_d",
    "o_carrier_id",
    "o_ol_cnt",
    "o_all_local",
];

const NEW_ORDER_COLUMNS: &[&str] = &["no_o_id", "no_d_id", "no_w_id"];

const ORDER_LINE_COLUMNS: &[&str] = &[
    "ol_o_id",
    "ol_d_id",
    "ol_w_id",
    "ol_number",
    "ol_i_id",
    "ol_supply_w_id",
    "ol_delivery_d",
    "ol_quantity",
    "ol_amount",
    "ol_dist_info",
];

/// Name, street 1, street 2, city, state and zip.
fn address<R: Rng>(rng: &mut R, name: (usize, usize)) -> Vec<String> {
    vec![
        helper::quote(&helper::random_string_between(rng, name.0, name.1)),
        helper::quote(&helper::random_string_between(rng, 10, 20)),
        helper::quote(&helper::random_string_between(rng, 10, 20)),
        helper::quote(&helper::random_string_between(rng, 10, 20)),
        helper::quote(&helper::random_string(rng, 2)),
        helper::quote(&helper::zip(rng)),
    ]
}

/// `warehouse`: one row per warehouse.
#[derive(Debug, Clone)]
pub struct WarehouseProducer {
    base: OrderedIdRowProducer,
}

impl WarehouseProducer {
    pub fn new(warehouses: i64) -> std::result::Result<Self, FatalError> {
        let base = OrderedIdRowProducer::new("warehouse", WAREHOUSE_COLUMNS, warehouses, &())?;
        Ok(WarehouseProducer { base })
    }
}

impl RowProducer for WarehouseProducer {
    fn base(&self) -> &OrderedIdRowProducer {
        &self.base
    }

    fn create_row(&self, row_index: u64) -> String {
        let mut rng = self.base.random_source(row_index);
        let mut values = vec![self.base.id(row_index)];
        values.extend(address(&mut rng, (6, 10)));
        values.push(helper::random_decimal(&mut rng, 2001, 4));
        values.push("300000.00".to_string());
        values.join(",")
    }
}

/// `item`: ids are bit-reversed row indices.
#[derive(Debug, Clone)]
pub struct ItemProducer {
    base: OrderedIdRowProducer,
}

impl ItemProducer {
    pub fn new(item_count: i64) -> std::result::Result<Self, FatalError> {
        let base = OrderedIdRowProducer::new("item", ITEM_COLUMNS, item_count, &())?;
        Ok(ItemProducer { base })
    }
}

impl RowProducer for ItemProducer {
    fn base(&self) -> &OrderedIdRowProducer {
        &self.base
    }

    fn create_row(&self, row_index: u64) -> String {
        let mut rng = self.base.random_source(row_index);
        [
            helper::reverse_id(row_index).to_string(),
            helper::rand(1, 10000, &mut rng).to_string(),
            helper::quote(&helper::random_string_between(&mut rng, 14, 24)),
            helper::random_decimal_between(&mut rng, 100, 10000, 2),
            helper::quote(&helper::item_data(&mut rng)),
        ]
        .join(",")
    }
}

/// `stock`: one row per item per warehouse.
#[derive(Debug, Clone)]
pub struct StockProducer {
    base: OrderedIdRowProducer,
    warehouse_id: u64,
}

impl StockProducer {
    pub fn new(warehouse_id: u64, item_count: i64) -> std::result::Result<Self, FatalError> {
        let base = OrderedIdRowProducer::new("stock", STOCK_COLUMNS, item_count, &warehouse_id)?;
        Ok(StockProducer { base, warehouse_id })
    }
}

impl RowProducer for StockProducer {
    fn base(&self) -> &OrderedIdRowProducer {
        &self.base
    }

    fn create_row(&self, row_index: u64) -> String {
        let mut rng = self.base.random_source(row_index);
        let mut values = vec![
            helper::reverse_id(row_index).to_string(),
            self.warehouse_id.to_string(),
            helper::rand(10, 100, &mut rng).to_string(),
        ];
        for _ in 0..10 {
            values.push(helper::quote(&helper::random_string(&mut rng, 24)));
        }
        values.push("0".to_string());
        values.push("0".to_string());
        values.push("0".to_string());
        values.push(helper::quote(&helper::item_data(&mut rng)));
        values.join(",")
    }
}

/// `district`: one row per district of a warehouse.
#[derive(Debug, Clone)]
pub struct DistrictProducer {
    base: OrderedIdRowProducer,
    warehouse_id: u64,
    next_order_id: u64,
}

impl DistrictProducer {
    pub fn new(
        warehouse_id: u64,
        districts: i64,
        customers_per_district: u64,
    ) -> std::result::Result<Self, FatalError> {
        let base =
            OrderedIdRowProducer::new("district", DISTRICT_COLUMNS, districts, &warehouse_id)?;
        Ok(DistrictProducer {
            base,
            warehouse_id,
            next_order_id: customers_per_district,
        })
    }
}

impl RowProducer for DistrictProducer {
    fn base(&self) -> &OrderedIdRowProducer {
        &self.base
    }

    fn create_row(&self, row_index: u64) -> String {
        let mut rng = self.base.random_source(row_index);
        let mut values = vec![self.base.id(row_index), self.warehouse_id.to_string()];
        values.extend(address(&mut rng, (6, 10)));
        values.push(helper::random_decimal(&mut rng, 2001, 4));
        values.push("30000.00".to_string());
        values.push(self.next_order_id.to_string());
        values.join(",")
    }
}

/// `customer`: one row per customer of a district.
#[derive(Debug, Clone)]
pub struct CustomerProducer {
    base: OrderedIdRowProducer,
    warehouse_id: u64,
    district_id: u64,
}

impl CustomerProducer {
    pub fn new(
        warehouse_id: u64,
        district_id: u64,
        customers: i64,
    ) -> std::result::Result<Self, FatalError> {
        let base = OrderedIdRowProducer::new(
            "customer",
            CUSTOMER_COLUMNS,
            customers,
            &(warehouse_id, district_id),
        )?;
        Ok(CustomerProducer {
            base,
            warehouse_id,
            district_id,
        })
    }
}

impl RowProducer for CustomerProducer {
    fn base(&self) -> &OrderedIdRowProducer {
        &self.base
    }

    fn create_row(&self, row_index: u64) -> String {
        let mut rng = self.base.random_source(row_index);
        let first = helper::quote(&helper::random_string_between(&mut rng, 8, 16));
        let last = helper::quote(&helper::customer_last_name(row_index, &mut rng));
        let mut values = vec![
            self.base.id(row_index),
            self.district_id.to_string(),
            self.warehouse_id.to_string(),
            first,
            helper::quote("OE"),
            last,
        ];
        // the customer address has no name
        values.extend(address(&mut rng, (10, 20)).into_iter().skip(1));
        values.push(helper::quote(&helper::random_digits(&mut rng, 16)));
        values.push(helper::now());
        let credit = if rng.gen_bool(0.1) { "BC" } else { "GC" };
        values.push(helper::quote(credit));
        values.push("50000.00".to_string());
        values.push(helper::random_decimal_between(&mut rng, 0, 5000, 4));
        values.push("-10.00".to_string());
        values.push("10.00".to_string());
        values.push("1".to_string());
        values.push("0".to_string());
        values.push(helper::quote(&helper::random_string_between(
            &mut rng, 300, 500,
        )));
        values.join(",")
    }
}

/// `history`: one row per customer.
#[derive(Debug, Clone)]
pub struct HistoryProducer {
    base: OrderedIdRowProducer,
    warehouse_id: u64,
    district_id: u64,
}

impl HistoryProducer {
    pub fn new(
        warehouse_id: u64,
        district_id: u64,
        customers: i64,
    ) -> std::result::Result<Self, FatalError> {
        let base = OrderedIdRowProducer::new(
            "history",
            HISTORY_COLUMNS,
            customers,
            &(warehouse_id, district_id),
        )?;
        Ok(HistoryProducer {
            base,
            warehouse_id,
            district_id,
        })
    }
}

impl RowProducer for HistoryProducer {
    fn base(&self) -> &OrderedIdRowProducer {
        &self.base
    }

    fn create_row(&self, row_index: u64) -> String {
        let mut rng = self.base.random_source(row_index);
        let d_id = self.district_id.to_string();
        let w_id = self.warehouse_id.to_string();
        [
            self.base.id(row_index),
            d_id.clone(),
            w_id.clone(),
            d_id,
            w_id,
            helper::now(),
            "10.00".to_string(),
            helper::quote(&helper::random_string_between(&mut rng, 12, 24)),
        ]
        .join(",")
    }
}

/// `orders`: one order per customer; orders with `row_index % 3 == 0` are undelivered.
#[derive(Debug, Clone)]
pub struct OrderProducer {
    base: OrderedIdRowProducer,
    warehouse_id: u64,
    district_id: u64,
    customers: u64,
    stride: u64,
    offset: u64,
}

impl OrderProducer {
    pub fn new(
        warehouse_id: u64,
        district_id: u64,
        customers: i64,
    ) -> std::result::Result<Self, FatalError> {
        let base = OrderedIdRowProducer::new(
            "orders",
            ORDER_COLUMNS,
            customers,
            &(warehouse_id, district_id),
        )?;
        let n = base.row_count().max(1);
        let h = helper::stable_hash(&("o_c_id", warehouse_id, district_id));

        // any stride coprime to n makes i -> (i * stride + offset) % n a permutation
        let mut stride = h % n + 1;
        while gcd(stride, n) != 1 {
            stride += 1;
        }

        Ok(OrderProducer {
            base,
            warehouse_id,
            district_id,
            customers: n,
            stride,
            offset: (h >> 32) % n,
        })
    }

    /// Customer that placed the order; each customer places exactly one order.
    pub fn customer_id(&self, row_index: u64) -> u64 {
        let c = (row_index as u128 * self.stride as u128 + self.offset as u128)
            % self.customers as u128;
        c as u64
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl RowProducer for OrderProducer {
    fn base(&self) -> &OrderedIdRowProducer {
        &self.base
    }

    fn create_row(&self, row_index: u64) -> String {
        let mut rng = self.base.random_source(row_index);
        let carrier = if row_index % 3 == 0 {
            String::new()
        } else {
            helper::rand(1, 10, &mut rng).to_string()
        };
        [
            self.base.id(row_index),
            self.district_id.to_string(),
            self.warehouse_id.to_string(),
            self.customer_id(row_index).to_string(),
            helper::now(),
            carrier,
            helper::order_line_count(self.warehouse_id, self.district_id, row_index).to_string(),
            "1".to_string(),
        ]
        .join(",")
    }
}

/// `new_orders`: row i references order 3 * i, the undelivered orders.
#[derive(Debug, Clone)]
pub struct NewOrderProducer {
    base: OrderedIdRowProducer,
    warehouse_id: u64,
    district_id: u64,
}

impl NewOrderProducer {
    pub fn new(
        warehouse_id: u64,
        district_id: u64,
        customers: i64,
    ) -> std::result::Result<Self, FatalError> {
        if customers < 0 {
            return Err(FatalError::InvalidRowCount(customers));
        }
        let base = OrderedIdRowProducer::new(
            "new_orders",
            NEW_ORDER_COLUMNS,
            (customers + 2) / 3,
            &(warehouse_id, district_id),
        )?;
        Ok(NewOrderProducer {
            base,
            warehouse_id,
            district_id,
        })
    }
}

impl RowProducer for NewOrderProducer {
    fn base(&self) -> &OrderedIdRowProducer {
        &self.base
    }

    fn create_row(&self, row_index: u64) -> String {
        [
            self.base.id(row_index * 3),
            self.district_id.to_string(),
            self.warehouse_id.to_string(),
        ]
        .join(",")
    }
}

/// `order_line`: 5 to 15 lines per order.
#[derive(Debug, Clone)]
pub struct OrderLineProducer {
    base: OrderedIdRowProducer,
    warehouse_id: u64,
    district_id: u64,
    item_count: u64,
}

impl OrderLineProducer {
    pub fn new(
        warehouse_id: u64,
        district_id: u64,
        item_count: u64,
        row_count: i64,
    ) -> std::result::Result<Self, FatalError> {
        if item_count == 0 {
            return Err(FatalError::InvalidConfiguration(
                "item_count must be > 0".to_string(),
            ));
        }
        let base = OrderedIdRowProducer::new(
            "order_line",
            ORDER_LINE_COLUMNS,
            row_count,
            &(warehouse_id, district_id),
        )?;
        Ok(OrderLineProducer {
            base,
            warehouse_id,
            district_id,
            item_count,
        })
    }

    pub fn order_line_count(&self, row_index: u64) -> u64 {
        helper::order_line_count(self.warehouse_id, self.district_id, row_index)
    }

    fn random_item<R: Rng>(&self, rng: &mut R) -> String {
        helper::reverse_id(rng.gen_range(0..self.item_count)).to_string()
    }

    fn delivery_date(&self, row_index: u64) -> String {
        if row_index % 3 == 0 {
            String::new()
        } else {
            helper::now()
        }
    }

    fn amount<R: Rng>(&self, row_index: u64, rng: &mut R) -> String {
        if row_index % 3 == 0 {
            "0.0".to_string()
        } else {
            helper::random_decimal_between(rng, 1, 10000, 2)
        }
    }
}

impl RowProducer for OrderLineProducer {
    fn base(&self) -> &OrderedIdRowProducer {
        &self.base
    }

    fn create_row(&self, row_index: u64) -> String {
        let mut rng = self.base.random_source(row_index);
        let o_id = self.base.id(row_index);
        let d_id = self.district_id.to_string();
        let w_id = self.warehouse_id.to_string();

        let mut lines = Vec::new();
        for line in 0..self.order_line_count(row_index) {
            let values = [
                o_id.clone(),
                d_id.clone(),
                w_id.clone(),
                line.to_string(),
                self.random_item(&mut rng),
                w_id.clone(),
                self.delivery_date(row_index),
                "5".to_string(),
                self.amount(row_index, &mut rng),
                helper::quote(&helper::random_string(&mut rng, 24)),
            ];
            lines.push(values.join(","));
        }
        lines.join("\n")
    }
}

//////////////////////////////
/// Bulk Loader. ///
//////////////////////////////

/// Outcome of a load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    /// Number of producers run, one per (table, scope).
    pub producers: usize,

    /// Logical rows generated.
    pub rows: u64,

    /// Physical lines handed to the sink.
    pub lines: u64,

    pub elapsed: Duration,
}

/// One producer per table and scope, in foreign-key order.
pub fn producers(config: &TpccConfiguration) -> std::result::Result<Vec<TpccProducer>, FatalError> {
    let customers = config.customers_per_district as i64;
    let items = config.item_count as i64;

    let mut producers = vec![
        TpccProducer::Warehouse(WarehouseProducer::new(config.warehouses as i64)?),
        TpccProducer::Item(ItemProducer::new(items)?),
    ];

    for w_id in 0..config.warehouses {
        producers.push(TpccProducer::Stock(StockProducer::new(w_id, items)?));
        producers.push(TpccProducer::District(DistrictProducer::new(
            w_id,
            config.districts_per_warehouse as i64,
            config.customers_per_district,
        )?));

        for d_id in 0..config.districts_per_warehouse {
            producers.push(TpccProducer::Customer(CustomerProducer::new(
                w_id, d_id, customers,
            )?));
            producers.push(TpccProducer::History(HistoryProducer::new(
                w_id, d_id, customers,
            )?));
            producers.push(TpccProducer::Order(OrderProducer::new(
                w_id, d_id, customers,
            )?));
            producers.push(TpccProducer::NewOrder(NewOrderProducer::new(
                w_id, d_id, customers,
            )?));
            producers.push(TpccProducer::OrderLine(OrderLineProducer::new(
                w_id,
                d_id,
                config.item_count,
                customers,
            )?));
        }
    }

    Ok(producers)
}

/// Generate every row of one producer and hand them to the sink in batches.
///
/// Returns (rows, lines).
pub fn load_table<P: RowProducer>(
    producer: &P,
    sink: &dyn BulkSink,
    batch_size: u64,
) -> Result<(u64, u64)> {
    let table = producer.table();
    let columns = producer.columns();
    let mut batch = String::new();
    let mut in_batch = 0;
    let mut lines = 0;

    for row_index in 0..producer.row_count() {
        let row = producer.create_row(row_index);
        lines += row.matches('\n').count() as u64 + 1;
        if in_batch > 0 {
            batch.push('\n');
        }
        batch.push_str(&row);
        in_batch += 1;

        if in_batch == batch_size {
            sink.insert(table, &columns, &batch)?;
            batch.clear();
            in_batch = 0;
        }
    }

    if in_batch > 0 {
        sink.insert(table, &columns, &batch)?;
    }

    debug!("Loaded {} rows into {}", producer.row_count(), table);
    Ok((producer.row_count(), lines))
}

/// Populate all tables.
pub fn populate_tables(config: &TpccConfiguration, sink: &dyn BulkSink) -> Result<LoadSummary> {
    let start = Instant::now();
    let mut producers = producers(config)?;
    let total = producers.len();

    if config.truncate_before_load {
        for table in TABLES.iter() {
            info!("Truncating {}", table);
            sink.truncate(table)?;
        }
    }

    // workers pop from the back
    producers.reverse();
    let queue = Mutex::new(producers);
    let failed = AtomicBool::new(false);
    let first_error: Mutex<Option<TpccError>> = Mutex::new(None);
    let rows = AtomicU64::new(0);
    let lines = AtomicU64::new(0);
    let progress: Option<Mutex<ProgressBar<Stdout>>> = if config.show_progress {
        Some(Mutex::new(ProgressBar::new(total as u64)))
    } else {
        None
    };

    let threads = config.load_parallelism().min(total).max(1);
    info!("Loading {} producers on {} threads", total, threads);

    let res = thread::scope(|s| -> Result<()> {
        for thread_id in 0..threads {
            let queue = &queue;
            let failed = &failed;
            let first_error = &first_error;
            let rows = &rows;
            let lines = &lines;
            let progress = &progress;

            s.builder()
                .name(format!("loader-{}", thread_id))
                .spawn(move |_| loop {
                    if failed.load(Ordering::Relaxed) {
                        break;
                    }

                    let producer = match queue.lock().pop() {
                        Some(producer) => producer,
                        None => break,
                    };

                    match load_table(&producer, sink, config.load_batch_size) {
                        Ok((r, l)) => {
                            rows.fetch_add(r, Ordering::Relaxed);
                            lines.fetch_add(l, Ordering::Relaxed);
                        }
                        Err(e) => {
                            failed.store(true, Ordering::Relaxed);
                            first_error.lock().get_or_insert(e);
                            break;
                        }
                    }

                    if let Some(pb) = progress {
                        pb.lock().inc();
                    }
                })?;
        }
        Ok(())
    });

    match res {
        Ok(spawned) => spawned?,
        Err(_) => return Err(Box::new(FatalError::WorkerPanicked)),
    }

    if let Some(e) = first_error.into_inner() {
        return Err(e);
    }

    sink.flush()?;

    if let Some(pb) = progress {
        pb.into_inner().finish_print("load complete");
    }

    let summary = LoadSummary {
        producers: total,
        rows: rows.into_inner(),
        lines: lines.into_inner(),
        elapsed: start.elapsed(),
    };
    info!(
        "Loaded {} rows ({} lines) in {:?}",
        summary.rows, summary.lines, summary.elapsed
    );
    Ok(summary)
}
