//! Row producers generate the text of one logical row from its index alone.
//!
//! A producer is built for one table and one scope (warehouse, district); every column value is a pure
//! function of the scope and the row index, apart from columns filled with `helper::now`.
use crate::common::error::FatalError;
use crate::workloads::tpcc::helper;
use crate::workloads::tpcc::loader::{
    CustomerProducer, DistrictProducer, HistoryProducer, ItemProducer, NewOrderProducer,
    OrderLineProducer, OrderProducer, StockProducer, WarehouseProducer,
};

use rand::rngs::StdRng;
use std::hash::Hash;

/// Shared state and primitives of a producer whose entity ids follow the row index.
#[derive(Debug, Clone)]
pub struct OrderedIdRowProducer {
    table: &'static str,
    columns: &'static [&'static str],
    row_count: u64,
    seed: u64,
}

impl OrderedIdRowProducer {
    /// Create a producer base; `scope` diversifies the random source between producer instances.
    pub fn new<S: Hash>(
        table: &'static str,
        columns: &'static [&'static str],
        row_count: i64,
        scope: &S,
    ) -> Result<Self, FatalError> {
        if row_count < 0 {
            return Err(FatalError::InvalidRowCount(row_count));
        }

        Ok(OrderedIdRowProducer {
            table,
            columns,
            row_count: row_count as u64,
            seed: helper::stable_hash(&(table, scope)),
        })
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Comma-joined column header.
    pub fn columns(&self) -> String {
        self.columns.join(",")
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Entity id of a row.
    pub fn id(&self, row_index: u64) -> String {
        row_index.to_string()
    }

    /// Random source of a row.
    pub fn random_source(&self, row_index: u64) -> StdRng {
        helper::row_rng(self.seed, row_index)
    }
}

/// Produces the rows of one table for one scope.
pub trait RowProducer {
    fn base(&self) -> &OrderedIdRowProducer;

    /// Text of the row at `row_index`, one line per physical row.
    ///
    /// `row_index` must be in [0, row_count).
    fn create_row(&self, row_index: u64) -> String;

    fn table(&self) -> &'static str {
        self.base().table()
    }

    fn columns(&self) -> String {
        self.base().columns()
    }

    fn row_count(&self) -> u64 {
        self.base().row_count()
    }
}

/// Producers of every TPC-C table.
#[derive(Debug, Clone)]
pub enum TpccProducer {
    Warehouse(WarehouseProducer),
    Item(ItemProducer),
    Stock(StockProducer),
    District(DistrictProducer),
    Customer(CustomerProducer),
    History(HistoryProducer),
    Order(OrderProducer),
    NewOrder(NewOrderProducer),
    OrderLine(OrderLineProducer),
}

impl RowProducer for TpccProducer {
    fn base(&self) -> &OrderedIdRowProducer {
        use TpccProducer::*;
        match self {
            Warehouse(ref p) => p.base(),
            Item(ref p) => p.base(),
            Stock(ref p) => p.base(),
            District(ref p) => p.base(),
            Customer(ref p) => p.base(),
            History(ref p) => p.base(),
            Order(ref p) => p.base(),
            NewOrder(ref p) => p.base(),
            OrderLine(ref p) => p.base(),
        }
    }

    fn create_row(&self, row_index: u64) -> String {
        use TpccProducer::*;
        match self {
            Warehouse(ref p) => p.create_row(row_index),
            Item(ref p) => p.create_row(row_index),
            Stock(ref p) => p.create_row(row_index),
            District(ref p) => p.create_row(row_index),
            Customer(ref p) => p.create_row(row_index),
            History(ref p) => p.create_row(row_index),
            Order(ref p) => p.create_row(row_index),
            NewOrder(ref p) => p.create_row(row_index),
            OrderLine(ref p) => p.create_row(row_index),
        }
    }
}
