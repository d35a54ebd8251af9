//! Contains:
//! + Row producers and the bulk loader.
//! + Parameter generator.
//! + Stored procedure interface.
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

pub mod helper;

pub mod producer;

pub mod loader;

pub mod profiles;

pub mod generator;

pub mod procedures;

/// Tables in load order.
pub const TABLES: &[&str] = &[
    "warehouse",
    "item",
    "stock",
    "district",
    "customer",
    "history",
    "orders",
    "new_orders",
    "order_line",
];

#[derive(EnumIter, Display, Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum TpccTransaction {
    NewOrder,
    Payment,
    OrderStatus,
    Delivery,
    StockLevel,
}
