pub mod tpcc;
