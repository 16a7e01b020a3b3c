use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    accounts::AccountStore, analytics::AnalyticsEngine, categories::CategoryStore,
    ledger::Ledger,
};

pub(crate) const CURRENT_SCHEMA_VERSION: u8 = 1;

/// A named set of books: categories plus the ledger and the accounts it drives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub categories: CategoryStore,
    #[serde(default)]
    pub ledger: Ledger,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Book::schema_version_default")]
    pub schema_version: u8,
}

impl Book {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_stores(name, AccountStore::new(), CategoryStore::new())
    }

    pub fn with_stores(
        name: impl Into<String>,
        accounts: AccountStore,
        categories: CategoryStore,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            categories,
            ledger: Ledger::new(accounts),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn accounts(&self) -> &AccountStore {
        self.ledger.accounts()
    }

    pub fn analytics(&self) -> AnalyticsEngine<'_> {
        self.ledger.analytics()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Lists operations whose account or category no longer resolves.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for operation in self.ledger.list() {
            if !self.accounts().contains(operation.account_id) {
                warnings.push(format!(
                    "operation {} references unknown account {}",
                    operation.id, operation.account_id
                ));
            }
            if !self.categories.contains(operation.category_id) {
                warnings.push(format!(
                    "operation {} references unknown category {}",
                    operation.id, operation.category_id
                ));
            }
        }
        for account in self.accounts().list() {
            match self.ledger.balance_from_operations(account.id) {
                Ok(expected) if account.balance() != expected => warnings.push(format!(
                    "account {} balance {} differs from operations total {}",
                    account.id,
                    account.balance(),
                    expected
                )),
                Ok(_) => {}
                Err(_) => warnings.push(format!(
                    "account {} operations total exceeds the supported range",
                    account.id
                )),
            }
        }
        warnings
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
