//! Stores, the ledger that keeps balances in step with operations, and analytics.

pub mod accounts;
pub mod analytics;
pub mod book;
pub mod categories;
#[allow(clippy::module_inception)]
pub mod ledger;
mod sequence;

pub use accounts::AccountStore;
pub use analytics::{AnalyticsEngine, DateRange, PeriodTotals};
pub use book::Book;
pub use categories::CategoryStore;
pub use ledger::{Ledger, Recorded};
