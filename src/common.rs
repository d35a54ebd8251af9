pub mod error;

pub mod message;

pub mod parameter_generation;

pub mod statistics;

pub mod utils;
