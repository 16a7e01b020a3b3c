//! Stateless entry points used by collaborators (CLI, importers, adapters).
//!
//! Each service validates input, delegates to the stores or ledger held by a
//! [`Book`](crate::ledger::Book), stamps the book as modified, and logs.

pub mod account_service;
pub mod analytics_service;
pub mod category_service;
pub mod operation_service;

pub use account_service::AccountService;
pub use analytics_service::AnalyticsService;
pub use category_service::CategoryService;
pub use operation_service::{ImportReport, OperationService};

use crate::core::errors::{EntityKind, LedgerError, Result};

pub type ServiceResult<T> = Result<T>;

fn normalize_name(entity: EntityKind, candidate: &str) -> ServiceResult<String> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        Err(LedgerError::InvalidInput(format!("{} name must not be empty", entity)))
    } else {
        Ok(trimmed.to_string())
    }
}
