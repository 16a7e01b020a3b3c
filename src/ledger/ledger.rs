use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::errors::{EntityKind, LedgerError, OrphanedReference, Result};
use crate::domain::{AccountId, Operation, OperationDraft, OperationId};

use super::{accounts::AccountStore, analytics::AnalyticsEngine, sequence::IdSequence};

/// Outcome of a successful [`Ledger::record`].
///
/// An operation against a missing account is still stored, but `orphaned` is set
/// and no balance moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub operation: Operation,
    pub orphaned: Option<OrphanedReference>,
}

impl Recorded {
    pub fn is_orphaned(&self) -> bool {
        self.orphaned.is_some()
    }

    /// Converts an orphaned outcome into an error. The operation stays recorded.
    pub fn strict(self) -> Result<Operation> {
        match self.orphaned {
            Some(orphan) => Err(LedgerError::OrphanedReference(orphan)),
            None => Ok(self.operation),
        }
    }
}

/// Authoritative set of operations plus the account store whose balances they drive.
///
/// Every balance change goes through `record`, `delete`, or `recompute`, and the
/// incremental path always agrees with a full recompute.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ledger {
    #[serde(default)]
    accounts: AccountStore,
    #[serde(default)]
    operations: Vec<Operation>,
    #[serde(default)]
    sequence: IdSequence,
    #[serde(default)]
    retired: BTreeSet<OperationId>,
}

impl Ledger {
    pub fn new(accounts: AccountStore) -> Self {
        Self {
            accounts,
            ..Self::default()
        }
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// Account CRUD access. Balances stay read-only through this handle.
    pub fn accounts_mut(&mut self) -> &mut AccountStore {
        &mut self.accounts
    }

    /// Peeks at the id an auto-numbered `record` would use; `None` once ids run out.
    pub fn next_operation_id(&self) -> Option<OperationId> {
        self.sequence.peek()
    }

    /// Moves the id sequence past `id` so auto-numbered records never collide with it.
    pub(crate) fn reserve_through(&mut self, id: OperationId) {
        self.sequence.observe(id);
    }

    /// Validates a draft without touching state and returns the id it would get.
    pub fn check(&self, draft: &OperationDraft) -> Result<OperationId> {
        let id = match draft.id {
            Some(id) => id,
            None => self
                .sequence
                .peek()
                .ok_or_else(|| LedgerError::duplicate(EntityKind::Operation, u64::MAX))?,
        };
        if self.operation(id).is_some() || self.retired.contains(&id) {
            return Err(LedgerError::duplicate(EntityKind::Operation, id));
        }
        if draft.amount < 0 {
            return Err(LedgerError::InvalidAmount(draft.amount));
        }
        if let Some(account) = self.accounts.get(draft.account_id) {
            let delta = draft.kind.signed(draft.amount);
            if account.balance().checked_add(delta).is_none() {
                return Err(LedgerError::overflow(format!(
                    "account {} balance",
                    account.id
                )));
            }
        }
        Ok(id)
    }

    /// Inserts an operation and posts its signed amount to the referenced account.
    pub fn record(&mut self, draft: OperationDraft) -> Result<Recorded> {
        let id = self.check(&draft)?;

        let mut operation = Operation::from_draft(id, draft);
        let orphaned = match self.accounts.get_mut(operation.account_id) {
            Some(account) => {
                account.adjust_balance(operation.signed_amount())?;
                operation.posted = true;
                None
            }
            None => {
                let orphan = OrphanedReference {
                    account: operation.account_id,
                    operation: Some(id),
                };
                tracing::warn!(
                    operation = id,
                    account = operation.account_id,
                    "recorded operation against missing account; balance not adjusted"
                );
                Some(orphan)
            }
        };

        self.sequence.observe(id);
        self.operations.push(operation.clone());
        Ok(Recorded {
            operation,
            orphaned,
        })
    }

    /// Removes an operation, reversing its original posted effect first. If the
    /// reversal would overflow the balance nothing changes.
    pub fn delete(&mut self, id: OperationId) -> Result<Operation> {
        let index = self
            .operations
            .iter()
            .position(|operation| operation.id == id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Operation, id))?;

        let operation = &self.operations[index];
        if operation.posted {
            if let Some(account) = self.accounts.get_mut(operation.account_id) {
                account.adjust_balance(-operation.signed_amount())?;
            }
        }

        self.retired.insert(id);
        let mut removed = self.operations.remove(index);
        removed.posted = false;
        Ok(removed)
    }

    /// Overwrites the account balance with the signed sum of its operations.
    pub fn recompute(&mut self, account_id: AccountId) -> Result<i64> {
        let balance = self.balance_from_operations(account_id)?;
        let account = self.accounts.get_mut(account_id).ok_or(OrphanedReference {
            account: account_id,
            operation: None,
        })?;
        account.set_balance(balance);
        for operation in self
            .operations
            .iter_mut()
            .filter(|operation| operation.account_id == account_id)
        {
            operation.posted = true;
        }
        Ok(balance)
    }

    /// Recomputes every stored account and returns how many balances changed.
    pub fn recompute_all(&mut self) -> usize {
        let ids: Vec<AccountId> = self.accounts.list().iter().map(|a| a.id).collect();
        let mut repaired = 0;
        for id in ids {
            let before = self.accounts.get(id).map(|a| a.balance());
            match self.recompute(id) {
                Ok(after) if before != Some(after) => repaired += 1,
                Ok(_) => {}
                Err(err) => tracing::warn!(account = id, %err, "balance left as stored"),
            }
        }
        repaired
    }

    /// Signed sum over all stored operations for the account, without writing it.
    pub fn balance_from_operations(&self, account_id: AccountId) -> Result<i64> {
        self.operations_for(account_id)
            .try_fold(0i64, |total, operation| {
                total.checked_add(operation.signed_amount())
            })
            .ok_or_else(|| {
                LedgerError::overflow(format!("account {} operations total", account_id))
            })
    }

    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.operations.iter().find(|operation| operation.id == id)
    }

    pub fn operations_for(&self, account_id: AccountId) -> impl Iterator<Item = &Operation> {
        self.operations
            .iter()
            .filter(move |operation| operation.account_id == account_id)
    }

    pub fn list(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn analytics(&self) -> AnalyticsEngine<'_> {
        AnalyticsEngine::new(&self.operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryKind;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn ledger_with_account() -> Ledger {
        let mut accounts = AccountStore::new();
        accounts.create(1, "Checking").unwrap();
        Ledger::new(accounts)
    }

    fn balance(ledger: &Ledger, id: AccountId) -> i64 {
        ledger.accounts().get(id).unwrap().balance()
    }

    #[test]
    fn record_adjusts_balance_by_signed_amount() {
        let mut ledger = ledger_with_account();
        ledger
            .record(OperationDraft::new(EntryKind::Income, 1, 500, date(10), 1).with_id(1))
            .unwrap();
        ledger
            .record(OperationDraft::new(EntryKind::Expense, 1, 200, date(15), 2).with_id(2))
            .unwrap();
        assert_eq!(balance(&ledger, 1), 300);
    }

    #[test]
    fn negative_amount_is_rejected_without_side_effects() {
        let mut ledger = ledger_with_account();
        let err = ledger
            .record(OperationDraft::new(EntryKind::Income, 1, -5, date(1), 1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(-5)));
        assert!(ledger.is_empty());
        assert_eq!(balance(&ledger, 1), 0);
        assert_eq!(ledger.next_operation_id(), Some(1));
    }

    #[test]
    fn duplicate_operation_id_is_rejected() {
        let mut ledger = ledger_with_account();
        let draft = OperationDraft::new(EntryKind::Income, 1, 10, date(1), 1).with_id(4);
        ledger.record(draft.clone()).unwrap();
        let err = ledger.record(draft).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::DuplicateId {
                entity: EntityKind::Operation,
                id: 4
            }
        ));
        assert_eq!(balance(&ledger, 1), 10);
    }

    #[test]
    fn deleted_operation_ids_are_not_reused() {
        let mut ledger = ledger_with_account();
        let first = ledger
            .record(OperationDraft::new(EntryKind::Income, 1, 10, date(1), 1))
            .unwrap();
        ledger.delete(first.operation.id).unwrap();
        let again =
            ledger.record(OperationDraft::new(EntryKind::Income, 1, 10, date(1), 1).with_id(first.operation.id));
        assert!(again.is_err());
    }

    #[test]
    fn delete_missing_operation_fails() {
        let mut ledger = ledger_with_account();
        let err = ledger.delete(9).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { id: 9, .. }));
    }

    #[test]
    fn orphaned_record_is_reported_and_recompute_picks_it_up() {
        let mut ledger = ledger_with_account();
        let recorded = ledger
            .record(OperationDraft::new(EntryKind::Income, 99, 40, date(3), 1))
            .unwrap();
        assert!(recorded.is_orphaned());
        assert!(!recorded.operation.is_posted());

        ledger.accounts_mut().create(99, "Late").unwrap();
        assert_eq!(balance(&ledger, 99), 0);
        assert_eq!(ledger.recompute(99).unwrap(), 40);
        assert_eq!(balance(&ledger, 99), 40);
    }

    #[test]
    fn deleting_unposted_orphan_leaves_new_account_untouched() {
        let mut ledger = ledger_with_account();
        let recorded = ledger
            .record(OperationDraft::new(EntryKind::Expense, 5, 70, date(3), 1))
            .unwrap();
        ledger.accounts_mut().create(5, "Created later").unwrap();
        ledger.delete(recorded.operation.id).unwrap();
        assert_eq!(balance(&ledger, 5), 0);
        assert_eq!(ledger.recompute(5).unwrap(), 0);
    }

    #[test]
    fn strict_outcome_surfaces_orphan_error() {
        let mut ledger = Ledger::default();
        let err = ledger
            .record(OperationDraft::new(EntryKind::Income, 3, 1, date(1), 1))
            .unwrap()
            .strict()
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::OrphanedReference(OrphanedReference { account: 3, .. })
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn recompute_missing_account_is_an_orphan_error() {
        let mut ledger = Ledger::default();
        let err = ledger.recompute(12).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::OrphanedReference(OrphanedReference {
                account: 12,
                operation: None
            })
        ));
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut ledger = ledger_with_account();
        ledger
            .record(OperationDraft::new(EntryKind::Income, 1, 80, date(2), 1))
            .unwrap();
        let first = ledger.recompute(1).unwrap();
        let second = ledger.recompute(1).unwrap();
        assert_eq!(first, second);
        assert_eq!(ledger.recompute_all(), 0);
    }

    #[test]
    fn overflowing_record_is_rejected_before_any_change() {
        let mut ledger = ledger_with_account();
        ledger
            .record(OperationDraft::new(EntryKind::Income, 1, i64::MAX, date(1), 1))
            .unwrap();
        let err = ledger
            .record(OperationDraft::new(EntryKind::Income, 1, 1, date(2), 1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Overflow(_)));
        assert_eq!(ledger.len(), 1);
        assert_eq!(balance(&ledger, 1), i64::MAX);
        assert_eq!(ledger.next_operation_id(), Some(2));

        ledger
            .record(OperationDraft::new(EntryKind::Expense, 1, i64::MAX, date(3), 2))
            .unwrap();
        assert_eq!(balance(&ledger, 1), 0);
    }

    #[test]
    fn overflowing_reversal_keeps_the_operation() {
        let mut ledger = ledger_with_account();
        ledger
            .record(OperationDraft::new(EntryKind::Income, 1, i64::MAX, date(1), 1).with_id(1))
            .unwrap();
        ledger
            .record(OperationDraft::new(EntryKind::Expense, 1, 1, date(2), 2).with_id(2))
            .unwrap();
        ledger
            .record(OperationDraft::new(EntryKind::Income, 1, 1, date(3), 1).with_id(3))
            .unwrap();

        let err = ledger.delete(2).unwrap_err();
        assert!(matches!(err, LedgerError::Overflow(_)));
        assert!(ledger.operation(2).is_some());
        assert_eq!(balance(&ledger, 1), i64::MAX);
    }

    #[test]
    fn overflowing_recompute_leaves_balance_alone() {
        let mut ledger = Ledger::default();
        for day in 1..=2 {
            ledger
                .record(OperationDraft::new(EntryKind::Income, 5, i64::MAX, date(day), 1))
                .unwrap();
        }
        ledger.accounts_mut().create(5, "Late").unwrap();

        let err = ledger.recompute(5).unwrap_err();
        assert!(matches!(err, LedgerError::Overflow(_)));
        assert_eq!(balance(&ledger, 5), 0);
        assert_eq!(ledger.recompute_all(), 0);
    }
}
