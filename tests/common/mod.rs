#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use finance_core::{
    core::services::{AccountService, CategoryService},
    domain::EntryKind,
    ledger::Book,
    storage::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Returns a fresh directory that outlives the calling test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Creates storage backed by a unique directory for each test.
pub fn setup_storage() -> JsonStorage {
    JsonStorage::new(Some(temp_home())).expect("create json storage backend")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Book with the given accounts plus income category 1 and expense category 2.
pub fn book_with_accounts(ids: &[u64]) -> Book {
    let mut book = Book::new("Test");
    CategoryService::create(&mut book, Some(1), EntryKind::Income, "Salary")
        .expect("create category");
    CategoryService::create(&mut book, Some(2), EntryKind::Expense, "Groceries")
        .expect("create category");
    for id in ids {
        AccountService::create(&mut book, Some(*id), &format!("Account {}", id))
            .expect("create account");
    }
    book
}

/// Small linear congruential generator so sequence tests are reproducible.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    pub fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}
