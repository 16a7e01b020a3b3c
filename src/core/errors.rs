use std::{fmt, result::Result as StdResult};

use thiserror::Error;

use crate::domain::common::{AccountId, OperationId};

/// Names the entity collection an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Account,
    Category,
    Operation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Account => "account",
            EntityKind::Category => "category",
            EntityKind::Operation => "operation",
        };
        f.write_str(label)
    }
}

/// An operation (or a recompute request) pointing at an account that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrphanedReference {
    pub account: AccountId,
    pub operation: Option<OperationId>,
}

impl fmt::Display for OrphanedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation {
            Some(operation) => write!(
                f,
                "operation {} references missing account {}",
                operation, self.account
            ),
            None => write!(f, "account {} does not exist", self.account),
        }
    }
}

/// Unified error type for the store, ledger, and storage layers.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Duplicate id: {entity} {id} already exists")]
    DuplicateId { entity: EntityKind, id: u64 },
    #[error("Not found: {entity} {id}")]
    NotFound { entity: EntityKind, id: u64 },
    #[error("Invalid amount: {0} (amounts must not be negative)")]
    InvalidAmount(i64),
    #[error("Amount overflow: {0} exceeds the supported range")]
    Overflow(String),
    #[error("Orphaned reference: {0}")]
    OrphanedReference(OrphanedReference),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LedgerError {
    pub(crate) fn duplicate(entity: EntityKind, id: u64) -> Self {
        LedgerError::DuplicateId { entity, id }
    }

    pub(crate) fn not_found(entity: EntityKind, id: u64) -> Self {
        LedgerError::NotFound { entity, id }
    }

    pub(crate) fn overflow(what: impl fmt::Display) -> Self {
        LedgerError::Overflow(what.to_string())
    }
}

impl From<OrphanedReference> for LedgerError {
    fn from(orphan: OrphanedReference) -> Self {
        LedgerError::OrphanedReference(orphan)
    }
}

pub type Result<T> = StdResult<T, LedgerError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orphan_messages_name_the_account() {
        let with_op = OrphanedReference {
            account: 99,
            operation: Some(3),
        };
        assert_eq!(
            with_op.to_string(),
            "operation 3 references missing account 99"
        );

        let err = LedgerError::from(OrphanedReference {
            account: 7,
            operation: None,
        });
        assert_eq!(
            err.to_string(),
            "Orphaned reference: account 7 does not exist"
        );
    }

    #[test]
    fn duplicate_message_includes_entity() {
        let err = LedgerError::duplicate(EntityKind::Category, 4);
        assert_eq!(err.to_string(), "Duplicate id: category 4 already exists");
    }

    #[test]
    fn overflow_message_names_the_total() {
        let err = LedgerError::overflow("account 1 balance");
        assert_eq!(
            err.to_string(),
            "Amount overflow: account 1 balance exceeds the supported range"
        );
    }
}
