//! Thread-safe handle for serving one book to concurrent callers.

use std::sync::{Arc, PoisonError, RwLock};

use crate::core::errors::Result;
use crate::domain::Operation;
use crate::ledger::Book;

/// Clonable handle around a [`Book`].
///
/// Mutations hold the write lock for their full duration, so balance updates are
/// serialised and readers never see an operation without its balance effect.
#[derive(Debug, Clone)]
pub struct SharedBook {
    inner: Arc<RwLock<Book>>,
}

impl SharedBook {
    pub fn new(book: Book) -> Self {
        Self {
            inner: Arc::new(RwLock::new(book)),
        }
    }

    pub fn read<T>(&self, reader: impl FnOnce(&Book) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        reader(&guard)
    }

    pub fn write<T>(&self, writer: impl FnOnce(&mut Book) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        writer(&mut guard)
    }

    /// Copies the current operations so analytics can run without holding the lock.
    pub fn snapshot(&self) -> Vec<Operation> {
        self.read(|book| book.ledger.list().to_vec())
    }

    /// Clones the whole book, e.g. for persisting it.
    pub fn to_book(&self) -> Book {
        self.read(Book::clone)
    }
}
