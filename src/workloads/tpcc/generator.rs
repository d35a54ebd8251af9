use crate::common::parameter_generation::Generator;
use crate::settings::TpccConfiguration;
use crate::workloads::tpcc::helper;
use crate::workloads::tpcc::profiles::*;
use crate::workloads::tpcc::TpccTransaction;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strum::IntoEnumIterator;

//////////////////////////////////////////
/// Parameter Generation. ///
//////////////////////////////////////////

/// TPC-C transaction generator; one per worker.
pub struct TpccGenerator {
    rng: StdRng,

    /// Number of transactions generated.
    generated: u64,

    /// Cumulative weights in `TpccTransaction` order.
    cumulative: Vec<(TpccTransaction, u32)>,
    total_weight: u32,

    home_warehouse: u64,
    warehouses: u64,
    districts: u64,
    customers: u64,
    items: u64,
}

impl TpccGenerator {
    /// Create a generator for a worker; the worker's home warehouse is `thread_id % warehouses`.
    pub fn new(thread_id: usize, config: &TpccConfiguration) -> TpccGenerator {
        let rng: StdRng = if config.set_seed {
            SeedableRng::seed_from_u64(config.seed.wrapping_add(thread_id as u64))
        } else {
            SeedableRng::from_entropy()
        };

        let mut cumulative = Vec::new();
        let mut total_weight = 0;
        for (transaction, weight) in TpccTransaction::iter().zip(config.weights().iter()) {
            total_weight += *weight;
            cumulative.push((transaction, total_weight));
        }

        TpccGenerator {
            rng,
            generated: 0,
            cumulative,
            total_weight,
            home_warehouse: thread_id as u64 % config.warehouses,
            warehouses: config.warehouses,
            districts: config.districts_per_warehouse,
            customers: config.customers_per_district,
            items: config.item_count,
        }
    }

    /// Pick a transaction type according to the configured mix.
    pub fn next_transaction(&mut self) -> TpccTransaction {
        let n = self.rng.gen_range(0..self.total_weight);
        self.cumulative
            .iter()
            .find(|(_, bound)| n < *bound)
            .map(|(transaction, _)| *transaction)
            .unwrap_or(TpccTransaction::NewOrder)
    }

    fn district(&mut self) -> u64 {
        helper::rand(0, self.districts - 1, &mut self.rng)
    }

    fn customer_id(&mut self) -> u64 {
        helper::nu_rand(1023, 0, self.customers - 1, &mut self.rng)
    }

    fn item_id(&mut self) -> i64 {
        helper::reverse_id(helper::nu_rand(8191, 0, self.items - 1, &mut self.rng))
    }

    /// Any warehouse other than the home warehouse, or the home warehouse if it is the only one.
    fn remote_warehouse(&mut self) -> u64 {
        if self.warehouses == 1 {
            return self.home_warehouse;
        }
        let other = helper::rand(0, self.warehouses - 2, &mut self.rng);
        if other >= self.home_warehouse {
            other + 1
        } else {
            other
        }
    }

    /// 60% by last name, 40% by id.
    fn customer(&mut self) -> CustomerSelector {
        if helper::rand(1, 100, &mut self.rng) <= 60 {
            let upper = (self.customers - 1).min(999);
            let num = helper::nu_rand(255, 0, upper, &mut self.rng);
            CustomerSelector::LastName(helper::last_name(num))
        } else {
            CustomerSelector::Id(self.customer_id())
        }
    }

    fn new_order(&mut self) -> NewOrder {
        let w_id = self.home_warehouse;
        let d_id = self.district();
        let c_id = self.customer_id();
        let ol_cnt = helper::rand(5, 15, &mut self.rng);
        let rollback = helper::rand(1, 100, &mut self.rng) == 1;

        let mut order_lines = Vec::with_capacity(ol_cnt as usize);
        for line in 0..ol_cnt {
            let ol_i_id = if rollback && line == ol_cnt - 1 {
                // item ids are [0, items), so this one is never loaded
                helper::reverse_id(self.items)
            } else {
                self.item_id()
            };

            let ol_supply_w_id = if helper::rand(1, 100, &mut self.rng) == 1 {
                self.remote_warehouse()
            } else {
                w_id
            };

            order_lines.push(OrderLine {
                ol_i_id,
                ol_supply_w_id,
                ol_quantity: helper::rand(1, 10, &mut self.rng),
            });
        }

        NewOrder {
            w_id,
            d_id,
            c_id,
            order_lines,
            rollback,
        }
    }

    fn payment(&mut self) -> Payment {
        let w_id = self.home_warehouse;
        let d_id = self.district();
        let (c_w_id, c_d_id) = if helper::rand(1, 100, &mut self.rng) <= 85 {
            (w_id, d_id)
        } else {
            (self.remote_warehouse(), self.district())
        };

        Payment {
            w_id,
            d_id,
            c_w_id,
            c_d_id,
            customer: self.customer(),
            h_amount: helper::random_decimal_between(&mut self.rng, 100, 500_000, 2),
        }
    }

    fn order_status(&mut self) -> OrderStatus {
        OrderStatus {
            w_id: self.home_warehouse,
            d_id: self.district(),
            customer: self.customer(),
        }
    }

    fn delivery(&mut self) -> Delivery {
        Delivery {
            w_id: self.home_warehouse,
            o_carrier_id: helper::rand(1, 10, &mut self.rng),
        }
    }

    fn stock_level(&mut self) -> StockLevel {
        StockLevel {
            w_id: self.home_warehouse,
            d_id: self.district(),
            threshold: helper::rand(10, 20, &mut self.rng),
        }
    }
}

impl Generator for TpccGenerator {
    type Profile = TpccTransactionProfile;

    /// Generate a transaction request.
    fn generate(&mut self) -> TpccTransactionProfile {
        self.generated += 1;
        match self.next_transaction() {
            TpccTransaction::NewOrder => TpccTransactionProfile::NewOrder(self.new_order()),
            TpccTransaction::Payment => TpccTransactionProfile::Payment(self.payment()),
            TpccTransaction::OrderStatus => {
                TpccTransactionProfile::OrderStatus(self.order_status())
            }
            TpccTransaction::Delivery => TpccTransactionProfile::Delivery(self.delivery()),
            TpccTransaction::StockLevel => TpccTransactionProfile::StockLevel(self.stock_level()),
        }
    }

    fn get_generated(&self) -> u64 {
        self.generated
    }
}
