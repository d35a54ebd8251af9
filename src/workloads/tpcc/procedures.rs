use crate::common::error::NonFatalError;
use crate::workloads::tpcc::profiles::*;

use std::thread;
use std::time::Duration;

/// Executes TPC-C transactions against a database.
///
/// Implementations own their session; one instance per worker thread.
pub trait TpccProcedures: Send {
    fn new_order(&mut self, params: &NewOrder) -> Result<(), NonFatalError>;

    fn payment(&mut self, params: &Payment) -> Result<(), NonFatalError>;

    fn order_status(&mut self, params: &OrderStatus) -> Result<(), NonFatalError>;

    fn delivery(&mut self, params: &Delivery) -> Result<(), NonFatalError>;

    fn stock_level(&mut self, params: &StockLevel) -> Result<(), NonFatalError>;
}

/// Execute a transaction.
pub fn execute<P: TpccProcedures + ?Sized>(
    procedures: &mut P,
    profile: &TpccTransactionProfile,
) -> Result<(), NonFatalError> {
    use TpccTransactionProfile::*;
    match profile {
        NewOrder(params) => procedures.new_order(params),
        Payment(params) => procedures.payment(params),
        OrderStatus(params) => procedures.order_status(params),
        Delivery(params) => procedures.delivery(params),
        StockLevel(params) => procedures.stock_level(params),
    }
}

/// Commits every transaction after a fixed latency; used when no database is attached.
#[derive(Debug, Clone, Default)]
pub struct DryRunProcedures {
    latency: Duration,
}

impl DryRunProcedures {
    pub fn new(latency: Duration) -> Self {
        DryRunProcedures { latency }
    }

    fn wait(&self) {
        if self.latency > Duration::from_secs(0) {
            thread::sleep(self.latency);
        }
    }
}

impl TpccProcedures for DryRunProcedures {
    // a requested rollback is expected behaviour and still counts as a new order
    fn new_order(&mut self, _params: &NewOrder) -> Result<(), NonFatalError> {
        self.wait();
        Ok(())
    }

    fn payment(&mut self, _params: &Payment) -> Result<(), NonFatalError> {
        self.wait();
        Ok(())
    }

    fn order_status(&mut self, _params: &OrderStatus) -> Result<(), NonFatalError> {
        self.wait();
        Ok(())
    }

    fn delivery(&mut self, _params: &Delivery) -> Result<(), NonFatalError> {
        self.wait();
        Ok(())
    }

    fn stock_level(&mut self, _params: &StockLevel) -> Result<(), NonFatalError> {
        self.wait();
        Ok(())
    }
}
