mod common;

use std::collections::BTreeMap;

use common::{book_with_accounts, date};
use finance_core::{
    core::{
        errors::{LedgerError, OrphanedReference},
        services::{AccountService, AnalyticsService, OperationService},
    },
    domain::{EntryKind, OperationDraft},
    ledger::{Book, DateRange},
};

fn january() -> DateRange {
    DateRange::new(date(2024, 1, 1), date(2024, 1, 31))
}

fn record_scenario(book: &mut Book) {
    OperationService::record(
        book,
        OperationDraft::new(EntryKind::Income, 1, 500, date(2024, 1, 10), 1).with_id(1),
    )
    .unwrap()
    .strict()
    .unwrap();
    OperationService::record(
        book,
        OperationDraft::new(EntryKind::Expense, 1, 200, date(2024, 1, 15), 2).with_id(2),
    )
    .unwrap()
    .strict()
    .unwrap();
}

fn balance(book: &Book, id: u64) -> i64 {
    AccountService::get(book, id).unwrap().balance()
}

#[test]
fn income_and_expense_scenario() {
    let mut book = book_with_accounts(&[1]);
    record_scenario(&mut book);

    assert_eq!(balance(&book, 1), 300);
    assert_eq!(
        AnalyticsService::income_expense_difference(&book, january()).unwrap(),
        300
    );
    assert_eq!(
        AnalyticsService::group_by_category(&book, january()).unwrap(),
        BTreeMap::from([(1, 500), (2, -200)])
    );
}

#[test]
fn deleting_the_income_leaves_only_the_expense() {
    let mut book = book_with_accounts(&[1]);
    record_scenario(&mut book);

    let removed = OperationService::delete(&mut book, 1).unwrap();
    assert_eq!(removed.amount, 500);
    assert_eq!(balance(&book, 1), -200);
    assert_eq!(
        AnalyticsService::group_by_category(&book, january()).unwrap(),
        BTreeMap::from([(2, -200)])
    );
    assert_eq!(OperationService::recompute(&mut book, 1).unwrap(), -200);
}

#[test]
fn orphaned_operation_counts_once_its_account_exists() {
    let mut book = book_with_accounts(&[1]);
    let recorded = OperationService::record(
        &mut book,
        OperationDraft::new(EntryKind::Income, 99, 120, date(2024, 2, 1), 1),
    )
    .unwrap();
    assert_eq!(
        recorded.orphaned,
        Some(OrphanedReference {
            account: 99,
            operation: Some(recorded.operation.id),
        })
    );
    assert_eq!(book.ledger.len(), 1);

    assert!(matches!(
        OperationService::recompute(&mut book, 99),
        Err(LedgerError::OrphanedReference(_))
    ));

    AccountService::create(&mut book, Some(99), "Savings").unwrap();
    assert_eq!(OperationService::recompute(&mut book, 99).unwrap(), 120);
    assert_eq!(balance(&book, 99), 120);
    assert!(book.warnings().is_empty());
}

#[test]
fn accounts_without_operations_stay_at_zero() {
    let mut book = book_with_accounts(&[1, 2, 3]);
    OperationService::record(
        &mut book,
        OperationDraft::new(EntryKind::Income, 2, 75, date(2024, 3, 3), 1),
    )
    .unwrap();

    assert_eq!(balance(&book, 1), 0);
    assert_eq!(balance(&book, 3), 0);
    assert_eq!(OperationService::recompute(&mut book, 3).unwrap(), 0);
}

#[test]
fn deleted_account_leaves_operations_dangling_until_checked() {
    let mut book = book_with_accounts(&[1]);
    record_scenario(&mut book);

    let removed = AccountService::delete(&mut book, 1).unwrap();
    assert_eq!(removed.balance(), 300);
    assert_eq!(book.ledger.operations_for(1).count(), 2);
    assert_eq!(book.warnings().len(), 2);
    assert_eq!(
        AnalyticsService::income_expense_difference(&book, january()).unwrap(),
        300
    );
}

#[test]
fn rename_keeps_identity_and_balance() {
    let mut book = book_with_accounts(&[1, 2]);
    record_scenario(&mut book);

    AccountService::rename(&mut book, 1, "  Household  ").unwrap();
    let names: Vec<_> = AccountService::list(&book)
        .into_iter()
        .map(|account| (account.id, account.name.clone()))
        .collect();
    assert_eq!(
        names,
        vec![(1, "Household".to_string()), (2, "Account 2".to_string())]
    );
    assert_eq!(balance(&book, 1), 300);

    let err = AccountService::rename(&mut book, 1, "   ").unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));
}
