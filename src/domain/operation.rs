use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// Input for recording an operation; `id` is optional so importers and the CLI
/// can let the ledger allocate one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OperationId>,
    pub kind: EntryKind,
    pub account_id: AccountId,
    pub amount: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    pub category_id: CategoryId,
}

impl OperationDraft {
    pub fn new(
        kind: EntryKind,
        account_id: AccountId,
        amount: i64,
        date: NaiveDate,
        category_id: CategoryId,
    ) -> Self {
        Self {
            id: None,
            kind,
            account_id,
            amount,
            date,
            description: String::new(),
            category_id,
        }
    }

    pub fn with_id(mut self, id: OperationId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A recorded income or expense. Operations never change after they are recorded;
/// the ledger only inserts and removes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Operation {
    pub id: OperationId,
    pub kind: EntryKind,
    pub account_id: AccountId,
    pub amount: i64,
    pub date: NaiveDate,
    pub description: String,
    pub category_id: CategoryId,
    /// Whether the signed amount is currently included in the account balance.
    #[serde(default)]
    pub(crate) posted: bool,
}

impl Operation {
    pub(crate) fn from_draft(id: OperationId, draft: OperationDraft) -> Self {
        Self {
            id,
            kind: draft.kind,
            account_id: draft.account_id,
            amount: draft.amount,
            date: draft.date,
            description: draft.description,
            category_id: draft.category_id,
            posted: false,
        }
    }

    /// Amount with the ledger sign convention applied.
    pub fn signed_amount(&self) -> i64 {
        self.kind.signed(self.amount)
    }

    pub fn is_posted(&self) -> bool {
        self.posted
    }
}

impl Identifiable for Operation {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Displayable for Operation {
    fn display_label(&self) -> String {
        format!(
            "op:{} {} {} {} acct:{} cat:{}",
            self.id,
            self.date.format("%Y-%m-%d"),
            self.kind,
            self.amount,
            self.account_id,
            self.category_id
        )
    }
}
