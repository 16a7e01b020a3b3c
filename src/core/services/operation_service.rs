//! Business logic helpers for recording and repairing operations.

use std::collections::HashSet;

use crate::core::errors::{EntityKind, LedgerError, OrphanedReference};
use crate::core::timing::timed;
use crate::domain::{AccountId, Operation, OperationDraft, OperationId};
use crate::ledger::{Book, Recorded};

use super::ServiceResult;

/// Summary of a batch import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub recorded: Vec<OperationId>,
    pub orphaned: Vec<OrphanedReference>,
}

/// Provides validated entry points for ledger operations.
pub struct OperationService;

impl OperationService {
    /// Records an operation; an orphaned outcome is returned, not swallowed.
    pub fn record(book: &mut Book, draft: OperationDraft) -> ServiceResult<Recorded> {
        let recorded = timed("operation.record", || book.ledger.record(draft))?;
        book.touch();
        if !recorded.is_orphaned() {
            tracing::info!(
                operation = recorded.operation.id,
                account = recorded.operation.account_id,
                amount = recorded.operation.signed_amount(),
                "operation recorded"
            );
        }
        Ok(recorded)
    }

    /// Removes the operation identified by `id`, returning the removed instance.
    pub fn delete(book: &mut Book, id: OperationId) -> ServiceResult<Operation> {
        let removed = timed("operation.delete", || book.ledger.delete(id))?;
        book.touch();
        tracing::info!(operation = id, account = removed.account_id, "operation deleted");
        Ok(removed)
    }

    pub fn recompute(book: &mut Book, account_id: AccountId) -> ServiceResult<i64> {
        let balance = timed("ledger.recompute", || book.ledger.recompute(account_id))?;
        book.touch();
        tracing::info!(account = account_id, balance, "balance recomputed");
        Ok(balance)
    }

    pub fn recompute_all(book: &mut Book) -> usize {
        let repaired = timed("ledger.recompute_all", || book.ledger.recompute_all());
        book.touch();
        if repaired > 0 {
            tracing::warn!(repaired, "balances drifted from their operations and were repaired");
        }
        repaired
    }

    /// Records a batch. Every draft is validated first and the batch is applied to a
    /// staged copy, so a bad draft or a running total that overflows leaves the
    /// ledger untouched.
    pub fn import(book: &mut Book, drafts: Vec<OperationDraft>) -> ServiceResult<ImportReport> {
        let mut explicit = HashSet::new();
        for draft in &drafts {
            if let Some(id) = draft.id {
                if !explicit.insert(id) {
                    return Err(LedgerError::duplicate(EntityKind::Operation, id));
                }
            }
            book.ledger.check(draft)?;
        }
        let mut staged = book.ledger.clone();
        if let Some(max) = explicit.iter().copied().max() {
            staged.reserve_through(max);
        }

        let mut report = ImportReport::default();
        timed("operation.import", || -> ServiceResult<()> {
            for draft in drafts {
                let recorded = staged.record(draft)?;
                report.recorded.push(recorded.operation.id);
                if let Some(orphan) = recorded.orphaned {
                    report.orphaned.push(orphan);
                }
            }
            Ok(())
        })?;
        book.ledger = staged;
        book.touch();
        tracing::info!(
            recorded = report.recorded.len(),
            orphaned = report.orphaned.len(),
            "operations imported"
        );
        Ok(report)
    }

    /// Returns a snapshot of the ledger's operations.
    pub fn list(book: &Book) -> Vec<&Operation> {
        book.ledger.list().iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::AccountService;
    use crate::domain::EntryKind;
    use chrono::NaiveDate;

    fn book_with_account() -> Book {
        let mut book = Book::new("Operations");
        AccountService::create(&mut book, Some(1), "Checking").unwrap();
        book
    }

    fn draft(kind: EntryKind, account: u64, amount: i64) -> OperationDraft {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        OperationDraft::new(kind, account, amount, date, 1)
    }

    #[test]
    fn delete_fails_for_missing_operation() {
        let mut book = book_with_account();
        let err = OperationService::delete(&mut book, 77).expect_err("delete must fail for unknown id");
        assert!(
            matches!(err, LedgerError::NotFound { entity: EntityKind::Operation, id: 77 }),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn import_is_all_or_nothing() {
        let mut book = book_with_account();
        let drafts = vec![
            draft(EntryKind::Income, 1, 10),
            draft(EntryKind::Expense, 1, -3),
        ];
        let err = OperationService::import(&mut book, drafts).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(-3)));
        assert!(OperationService::list(&book).is_empty());
        assert_eq!(book.accounts().get(1).unwrap().balance(), 0);
    }

    #[test]
    fn import_rejects_repeated_ids_within_the_batch() {
        let mut book = book_with_account();
        let drafts = vec![
            draft(EntryKind::Income, 1, 10).with_id(5),
            draft(EntryKind::Income, 1, 10).with_id(5),
        ];
        assert!(OperationService::import(&mut book, drafts).is_err());
        assert!(book.ledger.is_empty());
    }

    #[test]
    fn import_numbers_auto_ids_past_explicit_ones() {
        let mut book = book_with_account();
        let drafts = vec![
            draft(EntryKind::Income, 1, 10),
            draft(EntryKind::Expense, 42, 4).with_id(3),
        ];
        let report = OperationService::import(&mut book, drafts).unwrap();
        assert_eq!(report.recorded, vec![4, 3]);
        assert_eq!(
            report.orphaned,
            vec![OrphanedReference {
                account: 42,
                operation: Some(3)
            }]
        );
        assert_eq!(book.accounts().get(1).unwrap().balance(), 10);
    }

    #[test]
    fn import_that_overflows_midway_records_nothing() {
        let mut book = book_with_account();
        let drafts = vec![
            draft(EntryKind::Income, 1, i64::MAX),
            draft(EntryKind::Income, 1, 1),
        ];
        let err = OperationService::import(&mut book, drafts).unwrap_err();
        assert!(matches!(err, LedgerError::Overflow(_)));
        assert!(book.ledger.is_empty());
        assert_eq!(book.accounts().get(1).unwrap().balance(), 0);
        assert_eq!(book.ledger.next_operation_id(), Some(1));
    }

    #[test]
    fn recompute_all_repairs_nothing_on_a_consistent_book() {
        let mut book = book_with_account();
        OperationService::record(&mut book, draft(EntryKind::Income, 1, 25)).unwrap();
        assert_eq!(OperationService::recompute_all(&mut book), 0);
        assert_eq!(OperationService::recompute(&mut book, 1).unwrap(), 25);
    }
}
