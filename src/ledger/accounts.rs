use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::errors::{EntityKind, LedgerError, Result};
use crate::domain::{Account, AccountId};

use super::sequence::IdSequence;

/// Insertion-ordered collection of accounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountStore {
    #[serde(default)]
    accounts: Vec<Account>,
    #[serde(default)]
    sequence: IdSequence,
    #[serde(default)]
    retired: BTreeSet<AccountId>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an account with a caller-chosen id and a zero balance.
    pub fn create(&mut self, id: AccountId, name: impl Into<String>) -> Result<Account> {
        if self.contains(id) || self.retired.contains(&id) {
            return Err(LedgerError::duplicate(EntityKind::Account, id));
        }
        let account = Account::new(id, name);
        self.sequence.observe(id);
        self.accounts.push(account.clone());
        Ok(account)
    }

    /// Creates an account under the next free id. Fails once every id is taken.
    pub fn open(&mut self, name: impl Into<String>) -> Result<Account> {
        let id = self
            .sequence
            .allocate()
            .ok_or_else(|| LedgerError::duplicate(EntityKind::Account, u64::MAX))?;
        let account = Account::new(id, name);
        self.accounts.push(account.clone());
        Ok(account)
    }

    /// Renames an account in place; balance and position are preserved.
    pub fn rename(&mut self, id: AccountId, name: impl Into<String>) -> Result<()> {
        let account = self
            .get_mut(id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Account, id))?;
        account.name = name.into();
        Ok(())
    }

    /// Removes the account if present. Deleting an absent id is a no-op.
    pub fn delete(&mut self, id: AccountId) -> Option<Account> {
        let index = self.accounts.iter().position(|account| account.id == id)?;
        self.retired.insert(id);
        Some(self.accounts.remove(index))
    }

    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: AccountId) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    pub fn contains(&self, id: AccountId) -> bool {
        self.get(id).is_some()
    }

    pub fn list(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn is_retired(&self, id: AccountId) -> bool {
        self.retired.contains(&id)
    }
}
