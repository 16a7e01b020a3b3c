#![doc(test(attr(deny(warnings))))]

//! Finance Core keeps personal accounts, categories, and income/expense
//! operations, derives account balances from the operation history, and
//! answers date-windowed analytics over it.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod ledger;
pub mod storage;
pub mod utils;

/// Initializes global tracing. Safe to call more than once.
pub fn init() {
    utils::init_tracing();
}
