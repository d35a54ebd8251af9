use crate::common::error::NonFatalError;
use crate::workloads::tpcc::TpccTransaction;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Copy)]
pub enum Transaction {
    Tpcc(TpccTransaction),
}

/// Result of executing one transaction.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub enum Outcome {
    Committed,
    Aborted(NonFatalError),
    Failed(NonFatalError),
}

impl Outcome {
    /// Classify the result of a transaction execution.
    pub fn from_result(res: Result<(), NonFatalError>) -> Self {
        match res {
            Ok(()) => Outcome::Committed,
            Err(e) if e.is_abort() => Outcome::Aborted(e),
            Err(e) => Outcome::Failed(e),
        }
    }
}
