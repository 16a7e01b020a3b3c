use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::{
        errors::{EntityKind, LedgerError, Result},
        utils::{canonical_name, ensure_dir, write_atomic, PathResolver},
    },
    domain::{Account, AccountId, OperationDraft},
    ledger::{book::CURRENT_SCHEMA_VERSION, Book},
};

use super::{AccountBackend, StorageBackend};

const BOOK_EXTENSION: &str = "json";

/// Stores each book as one pretty-printed JSON document under `<home>/books`.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    books_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let books_dir = PathResolver::books_dir_in(&app_root);
        ensure_dir(&books_dir)?;
        Ok(Self {
            root: app_root,
            books_dir,
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Account hooks scoped to one stored book.
    pub fn accounts(&self, book: &str) -> StoredAccounts<'_> {
        StoredAccounts {
            storage: self,
            book: book.to_string(),
        }
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, book: &Book, name: &str) -> Result<PathBuf> {
        let path = self.book_path(name);
        save_book_to_path(book, &path)?;
        tracing::info!(path = %path.display(), "book saved");
        Ok(path)
    }

    fn load(&self, name: &str) -> Result<Book> {
        let path = self.book_path(name);
        if !path.exists() {
            return Err(LedgerError::Storage(format!("book `{}` not found", name)));
        }
        load_book_from_path(&path)
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.books_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BOOK_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.book_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn book_path(&self, name: &str) -> PathBuf {
        self.books_dir
            .join(format!("{}.{}", canonical_name(name), BOOK_EXTENSION))
    }
}

/// [`AccountBackend`] over a book file: every load reads the file, every save
/// rewrites it. Saves only carry the name; the balance stays derived from the
/// book's operations and deleted accounts stay deleted.
pub struct StoredAccounts<'a> {
    storage: &'a JsonStorage,
    book: String,
}

impl AccountBackend for StoredAccounts<'_> {
    fn load_account(&self, id: AccountId) -> Result<Option<Account>> {
        let book = self.storage.load(&self.book)?;
        Ok(book.accounts().get(id).cloned())
    }

    fn save_account(&mut self, account: &Account) -> Result<Account> {
        let mut book = self.storage.load(&self.book)?;
        let accounts = book.ledger.accounts_mut();
        if accounts.is_retired(account.id) {
            tracing::warn!(
                account = account.id,
                book = %self.book,
                "write to deleted account refused"
            );
        }
        accounts.rename(account.id, account.name.clone())?;
        let stored = accounts
            .get(account.id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(EntityKind::Account, account.id))?;
        book.touch();
        self.storage.save(&book, &self.book)?;
        Ok(stored)
    }
}

pub fn save_book_to_path(book: &Book, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(book)?;
    write_atomic(path, &json)
}

/// Loads a book, refusing files written by a newer schema.
pub fn load_book_from_path(path: &Path) -> Result<Book> {
    let data = fs::read_to_string(path)?;
    let book: Book = serde_json::from_str(&data)?;
    if book.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(LedgerError::Storage(format!(
            "book schema v{} is newer than supported v{}",
            book.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(book)
}

/// Reads a JSON array of operation drafts, e.g. an export from another tool.
pub fn import_operations(path: &Path) -> Result<Vec<OperationDraft>> {
    let data = fs::read_to_string(path)?;
    let drafts: Vec<OperationDraft> = serde_json::from_str(&data)?;
    tracing::debug!(path = %path.display(), count = drafts.len(), "operation drafts read");
    Ok(drafts)
}
