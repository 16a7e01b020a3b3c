pub mod account;
pub mod category;
pub mod common;
pub mod operation;

pub use account::Account;
pub use category::Category;
pub use common::{
    AccountId, CategoryId, Displayable, EntryKind, Identifiable, NamedEntity, OperationId,
};
pub use operation::{Operation, OperationDraft};

// Re-export common dependencies so consumers can rely on this module as a façade.
pub use chrono;
pub use serde;
