//! Common types used across the application.

pub mod id;
pub mod key;
pub mod quantity;

pub use id::*;
pub use key::StockKey;
pub use quantity::{MAX_RECORD_QUANTITY, Quantity, percent_of, round_days, round_quantity};

#[cfg(test)]
mod id_tests;
