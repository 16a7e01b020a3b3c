use serde::{Deserialize, Serialize};

use crate::core::errors::{LedgerError, Result};
use crate::domain::common::*;

/// Represents a financial account tracked within the ledger.
///
/// The balance is derived from the ledger's operations and can only be changed
/// from inside the crate, so callers cannot drift it away from its history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    #[serde(default)]
    balance: i64,
}

impl Account {
    /// Creates a new account with a zero balance.
    pub fn new(id: AccountId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            balance: 0,
        }
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Applies a signed delta. On overflow the balance is left unchanged.
    pub(crate) fn adjust_balance(&mut self, delta: i64) -> Result<()> {
        self.balance = self.balance.checked_add(delta).ok_or_else(|| {
            LedgerError::overflow(format!("account {} balance", self.id))
        })?;
        Ok(())
    }

    pub(crate) fn set_balance(&mut self, balance: i64) {
        self.balance = balance;
    }
}

impl Identifiable for Account {
    fn id(&self) -> u64 {
        self.id
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Account {
    fn display_label(&self) -> String {
        format!("#{} {} (balance {})", self.id, self.name, self.balance)
    }
}
