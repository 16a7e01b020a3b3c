use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::core::errors::LedgerError;

pub type AccountId = u64;
pub type CategoryId = u64;
pub type OperationId = u64;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> u64;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Direction of money flow, shared by categories and operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    /// Applies the ledger sign convention: income counts positively, expense negatively.
    pub fn signed(self, amount: i64) -> i64 {
        match self {
            EntryKind::Income => amount,
            EntryKind::Expense => -amount,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        };
        f.write_str(label)
    }
}

impl FromStr for EntryKind {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(EntryKind::Income),
            "expense" => Ok(EntryKind::Expense),
            other => Err(LedgerError::InvalidInput(format!(
                "unknown kind `{}` (expected income or expense)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_follows_kind() {
        assert_eq!(EntryKind::Income.signed(500), 500);
        assert_eq!(EntryKind::Expense.signed(200), -200);
        assert_eq!(EntryKind::Expense.signed(0), 0);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Income".parse::<EntryKind>().unwrap(), EntryKind::Income);
        assert_eq!(" EXPENSE ".parse::<EntryKind>().unwrap(), EntryKind::Expense);
        assert!("transfer".parse::<EntryKind>().is_err());
    }
}
