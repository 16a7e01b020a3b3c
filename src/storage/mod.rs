pub mod cache;
pub mod json_backend;

use std::path::{Path, PathBuf};

use crate::{core::errors::Result, domain::Account, domain::AccountId, ledger::Book};

/// Abstraction over persistence backends capable of storing whole books.
pub trait StorageBackend: Send + Sync {
    fn save(&self, book: &Book, name: &str) -> Result<PathBuf>;
    fn load(&self, name: &str) -> Result<Book>;
    fn list(&self) -> Result<Vec<String>>;
    fn delete(&self, name: &str) -> Result<()>;
    fn book_path(&self, name: &str) -> PathBuf;

    /// Optional helpers for ad-hoc file operations.
    fn save_to_path(&self, book: &Book, path: &Path) -> Result<()> {
        json_backend::save_book_to_path(book, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<Book> {
        json_backend::load_book_from_path(path)
    }
}

/// Per-account load/save hooks consumed by [`cache::AccountCache`].
pub trait AccountBackend {
    fn load_account(&self, id: AccountId) -> Result<Option<Account>>;

    /// Persists the account and returns it as stored. Backends own the balance,
    /// so the returned value may differ from the one passed in.
    fn save_account(&mut self, account: &Account) -> Result<Account>;
}

pub use cache::{AccountCache, CacheStats};
pub use json_backend::{import_operations, JsonStorage, StoredAccounts};
