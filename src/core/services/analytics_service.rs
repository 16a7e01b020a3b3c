use std::collections::BTreeMap;

use crate::core::errors::Result;
use crate::core::timing::timed;
use crate::domain::CategoryId;
use crate::ledger::{Book, DateRange, PeriodTotals};

/// Read-only reporting over a book's operations.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn income_expense_difference(book: &Book, range: DateRange) -> Result<i64> {
        timed("analytics.difference", || book.analytics().difference_in(range))
    }

    pub fn group_by_category(book: &Book, range: DateRange) -> Result<BTreeMap<CategoryId, i64>> {
        timed("analytics.group_by_category", || book.analytics().group_in(range))
    }

    pub fn totals(book: &Book, range: DateRange) -> Result<PeriodTotals> {
        timed("analytics.totals", || book.analytics().totals(range))
    }
}
