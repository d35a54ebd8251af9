use crate::workloads::tpcc::TpccTransaction;

use serde::{Deserialize, Serialize};
use std::fmt;

///////////////////////////////////////
/// Transaction Profiles. ///
//////////////////////////////////////

/// How a customer is identified.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub enum CustomerSelector {
    Id(u64),
    LastName(String),
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct OrderLine {
    pub ol_i_id: i64,
    pub ol_supply_w_id: u64,
    pub ol_quantity: u64,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct NewOrder {
    pub w_id: u64,
    pub d_id: u64,
    pub c_id: u64,
    pub order_lines: Vec<OrderLine>,
    /// The last order line references an unused item and the transaction must roll back.
    pub rollback: bool,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Payment {
    pub w_id: u64,
    pub d_id: u64,
    pub c_w_id: u64,
    pub c_d_id: u64,
    pub customer: CustomerSelector,
    pub h_amount: String,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct OrderStatus {
    pub w_id: u64,
    pub d_id: u64,
    pub customer: CustomerSelector,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Delivery {
    pub w_id: u64,
    pub o_carrier_id: u64,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct StockLevel {
    pub w_id: u64,
    pub d_id: u64,
    pub threshold: u64,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub enum TpccTransactionProfile {
    NewOrder(NewOrder),
    Payment(Payment),
    OrderStatus(OrderStatus),
    Delivery(Delivery),
    StockLevel(StockLevel),
}

impl TpccTransactionProfile {
    pub fn transaction(&self) -> TpccTransaction {
        use TpccTransactionProfile::*;
        match self {
            NewOrder(_) => TpccTransaction::NewOrder,
            Payment(_) => TpccTransaction::Payment,
            OrderStatus(_) => TpccTransaction::OrderStatus,
            Delivery(_) => TpccTransaction::Delivery,
            StockLevel(_) => TpccTransaction::StockLevel,
        }
    }

    /// Whether the transaction only reads.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            TpccTransactionProfile::OrderStatus(_) | TpccTransactionProfile::StockLevel(_)
        )
    }
}

impl fmt::Display for CustomerSelector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CustomerSelector::Id(c_id) => write!(f, "{}", c_id),
            CustomerSelector::LastName(name) => write!(f, "{}", name),
        }
    }
}

// [w_id, d_id, ...]
impl fmt::Display for TpccTransactionProfile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TpccTransactionProfile::*;
        match self {
            NewOrder(p) => write!(
                f,
                "[{},{},{},{},{}]",
                p.w_id,
                p.d_id,
                p.c_id,
                p.order_lines.len(),
                p.rollback
            ),
            Payment(p) => write!(
                f,
                "[{},{},{},{},{},{}]",
                p.w_id, p.d_id, p.c_w_id, p.c_d_id, p.customer, p.h_amount
            ),
            OrderStatus(p) => write!(f, "[{},{},{}]", p.w_id, p.d_id, p.customer),
            Delivery(p) => write!(f, "[{},{}]", p.w_id, p.o_carrier_id),
            StockLevel(p) => write!(f, "[{},{},{}]", p.w_id, p.d_id, p.threshold),
        }
    }
}
