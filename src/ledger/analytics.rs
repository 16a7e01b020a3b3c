//! Read-only aggregations over a snapshot of ledger operations.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::errors::{LedgerError, Result};
use crate::domain::{CategoryId, EntryKind, Operation};

/// Closed calendar interval; both ends are included. A range whose end precedes
/// its start matches nothing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodTotals {
    pub income: i64,
    pub expense: i64,
    pub net: i64,
}

/// Stateless analytics over borrowed operations. Nothing here can mutate the ledger.
/// Sums that leave the `i64` range are reported as [`LedgerError::Overflow`].
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsEngine<'a> {
    operations: &'a [Operation],
}

impl<'a> AnalyticsEngine<'a> {
    pub fn new(operations: &'a [Operation]) -> Self {
        Self { operations }
    }

    /// Income minus expense for operations dated within `[start, end]`.
    pub fn income_expense_difference(&self, start: NaiveDate, end: NaiveDate) -> Result<i64> {
        self.difference_in(DateRange::new(start, end))
    }

    pub fn difference_in(&self, range: DateRange) -> Result<i64> {
        self.in_range(range)
            .try_fold(0i64, |total, operation| add(total, operation.signed_amount(), "difference"))
    }

    /// Signed sum per category for operations dated within `[start, end]`.
    pub fn group_by_category(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<CategoryId, i64>> {
        self.group_in(DateRange::new(start, end))
    }

    pub fn group_in(&self, range: DateRange) -> Result<BTreeMap<CategoryId, i64>> {
        let mut groups = BTreeMap::new();
        for operation in self.in_range(range) {
            let total = groups.entry(operation.category_id).or_insert(0);
            *total = add(*total, operation.signed_amount(), "category total")?;
        }
        Ok(groups)
    }

    pub fn totals(&self, range: DateRange) -> Result<PeriodTotals> {
        let mut totals = PeriodTotals::default();
        for operation in self.in_range(range) {
            match operation.kind {
                EntryKind::Income => {
                    totals.income = add(totals.income, operation.amount, "income total")?
                }
                EntryKind::Expense => {
                    totals.expense = add(totals.expense, operation.amount, "expense total")?
                }
            }
        }
        totals.net = totals
            .income
            .checked_sub(totals.expense)
            .ok_or_else(|| LedgerError::overflow("net total"))?;
        Ok(totals)
    }

    fn in_range(&self, range: DateRange) -> impl Iterator<Item = &'a Operation> {
        self.operations
            .iter()
            .filter(move |operation| range.contains(operation.date))
    }
}

fn add(total: i64, delta: i64, what: &str) -> Result<i64> {
    total
        .checked_add(delta)
        .ok_or_else(|| LedgerError::overflow(what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OperationDraft;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn op(id: u64, kind: EntryKind, amount: i64, when: NaiveDate, category: u64) -> Operation {
        Operation::from_draft(id, OperationDraft::new(kind, 1, amount, when, category))
    }

    fn sample() -> Vec<Operation> {
        vec![
            op(1, EntryKind::Income, 500, date(1, 10), 1),
            op(2, EntryKind::Expense, 200, date(1, 15), 2),
            op(3, EntryKind::Expense, 50, date(2, 1), 2),
            op(4, EntryKind::Income, 70, date(1, 31), 3),
            op(5, EntryKind::Expense, 70, date(1, 31), 3),
        ]
    }

    #[test]
    fn bounds_are_inclusive() {
        let ops = sample();
        let engine = AnalyticsEngine::new(&ops);
        let diff = |start, end| engine.income_expense_difference(start, end).unwrap();
        assert_eq!(diff(date(1, 10), date(1, 10)), 500);
        assert_eq!(diff(date(1, 1), date(1, 31)), 300);
        assert_eq!(diff(date(1, 1), date(2, 1)), 250);
    }

    #[test]
    fn reversed_range_is_empty() {
        let ops = sample();
        let engine = AnalyticsEngine::new(&ops);
        assert!(DateRange::new(date(2, 1), date(1, 1)).is_empty());
        assert_eq!(engine.income_expense_difference(date(2, 1), date(1, 1)).unwrap(), 0);
        assert!(engine.group_by_category(date(2, 1), date(1, 1)).unwrap().is_empty());
    }

    #[test]
    fn groups_keep_categories_that_net_to_zero_but_skip_absent_ones() {
        let ops = sample();
        let engine = AnalyticsEngine::new(&ops);
        let groups = engine.group_by_category(date(1, 1), date(1, 31)).unwrap();
        assert_eq!(groups.get(&1), Some(&500));
        assert_eq!(groups.get(&2), Some(&-200));
        assert_eq!(groups.get(&3), Some(&0));
        assert_eq!(groups.len(), 3);

        let february = engine.group_by_category(date(2, 1), date(2, 29)).unwrap();
        assert_eq!(february.into_iter().collect::<Vec<_>>(), vec![(2, -50)]);
    }

    #[test]
    fn totals_split_income_and_expense() {
        let ops = sample();
        let engine = AnalyticsEngine::new(&ops);
        let totals = engine
            .totals(DateRange::new(date(1, 1), date(1, 31)))
            .unwrap();
        assert_eq!(
            totals,
            PeriodTotals {
                income: 570,
                expense: 270,
                net: 300
            }
        );
    }

    #[test]
    fn sums_past_the_integer_range_are_errors() {
        let ops = vec![
            op(1, EntryKind::Income, i64::MAX, date(3, 1), 1),
            op(2, EntryKind::Income, 1, date(3, 2), 1),
            op(3, EntryKind::Expense, 1, date(3, 3), 2),
        ];
        let engine = AnalyticsEngine::new(&ops);
        let march = DateRange::new(date(3, 1), date(3, 31));

        assert!(matches!(engine.difference_in(march), Err(LedgerError::Overflow(_))));
        assert!(matches!(engine.group_in(march), Err(LedgerError::Overflow(_))));
        assert!(matches!(engine.totals(march), Err(LedgerError::Overflow(_))));

        let first_day = DateRange::new(date(3, 1), date(3, 1));
        assert_eq!(engine.difference_in(first_day).unwrap(), i64::MAX);
    }
}
