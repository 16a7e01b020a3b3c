//! Read-through, write-through account cache in front of an [`AccountBackend`].

use moka::sync::Cache;

use crate::core::errors::Result;
use crate::domain::{Account, AccountId};

use super::AccountBackend;

/// Entries kept before the least recently used accounts are dropped.
pub const DEFAULT_CAPACITY: u64 = 1_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoises accounts by id. Writes go to the backend first and the entry is
/// replaced with what the backend stored; a failed write evicts the entry, so
/// a `get` never returns a balance the backend does not hold.
pub struct AccountCache<B: AccountBackend> {
    backend: B,
    entries: Cache<AccountId, Account>,
    stats: CacheStats,
}

impl<B: AccountBackend> AccountCache<B> {
    pub fn new(backend: B) -> Self {
        Self::with_capacity(backend, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(backend: B, max_capacity: u64) -> Self {
        Self {
            backend,
            entries: Cache::builder().max_capacity(max_capacity).build(),
            stats: CacheStats::default(),
        }
    }

    /// Returns the cached account, loading and caching it on a miss.
    /// Accounts the backend does not know are not cached.
    pub fn get(&mut self, id: AccountId) -> Result<Option<Account>> {
        if let Some(account) = self.entries.get(&id) {
            self.stats.hits += 1;
            return Ok(Some(account));
        }
        self.stats.misses += 1;
        let loaded = self.backend.load_account(id)?;
        if let Some(account) = &loaded {
            self.entries.insert(id, account.clone());
        }
        Ok(loaded)
    }

    /// Writes through and caches the stored account, returning it.
    pub fn put(&mut self, account: Account) -> Result<Account> {
        match self.backend.save_account(&account) {
            Ok(stored) => {
                self.entries.insert(stored.id, stored.clone());
                Ok(stored)
            }
            Err(err) => {
                self.entries.invalidate(&account.id);
                tracing::warn!(
                    account = account.id,
                    error = %err,
                    "write-through failed; cache entry evicted"
                );
                Err(err)
            }
        }
    }

    pub fn invalidate(&self, id: AccountId) {
        self.entries.invalidate(&id);
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}
