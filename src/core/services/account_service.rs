use crate::core::errors::EntityKind;
use crate::core::timing::timed;
use crate::domain::{Account, AccountId};
use crate::ledger::Book;

use super::{normalize_name, ServiceResult};

pub struct AccountService;

impl AccountService {
    /// Creates an account under `id`, or under the next free id when `id` is `None`.
    pub fn create(book: &mut Book, id: Option<AccountId>, name: &str) -> ServiceResult<Account> {
        let name = normalize_name(EntityKind::Account, name)?;
        let accounts = book.ledger.accounts_mut();
        let account = timed("account.create", || match id {
            Some(id) => accounts.create(id, name),
            None => accounts.open(name),
        })?;
        book.touch();
        tracing::info!(account = account.id, name = %account.name, "account created");
        Ok(account)
    }

    pub fn rename(book: &mut Book, id: AccountId, name: &str) -> ServiceResult<()> {
        let name = normalize_name(EntityKind::Account, name)?;
        book.ledger.accounts_mut().rename(id, name)?;
        book.touch();
        tracing::info!(account = id, "account renamed");
        Ok(())
    }

    /// Deletes the account if it exists. Its operations stay in the ledger as
    /// orphaned references.
    pub fn delete(book: &mut Book, id: AccountId) -> Option<Account> {
        let removed = book.ledger.accounts_mut().delete(id)?;
        let dangling = book.ledger.operations_for(id).count();
        book.touch();
        if dangling > 0 {
            tracing::warn!(
                account = id,
                operations = dangling,
                "deleted account still referenced by operations"
            );
        } else {
            tracing::info!(account = id, "account deleted");
        }
        Some(removed)
    }

    pub fn get(book: &Book, id: AccountId) -> Option<&Account> {
        book.accounts().get(id)
    }

    pub fn list(book: &Book) -> Vec<&Account> {
        book.accounts().list().iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::LedgerError;

    #[test]
    fn blank_names_are_rejected() {
        let mut book = Book::new("Accounts");
        let err = AccountService::create(&mut book, None, "   ").unwrap_err();
        assert!(
            matches!(err, LedgerError::InvalidInput(ref message) if message.contains("account")),
            "unexpected error: {err:?}"
        );
        assert!(book.accounts().is_empty());
    }

    #[test]
    fn names_are_trimmed_and_ids_allocated() {
        let mut book = Book::new("Accounts");
        let first = AccountService::create(&mut book, None, "  Checking ").unwrap();
        let second = AccountService::create(&mut book, Some(10), "Savings").unwrap();
        let third = AccountService::create(&mut book, None, "Cash").unwrap();
        assert_eq!(first.name, "Checking");
        assert_eq!((first.id, second.id, third.id), (1, 10, 11));
    }

    #[test]
    fn delete_twice_is_harmless() {
        let mut book = Book::new("Accounts");
        let account = AccountService::create(&mut book, None, "Checking").unwrap();
        assert!(AccountService::delete(&mut book, account.id).is_some());
        assert!(AccountService::delete(&mut book, account.id).is_none());
        assert!(AccountService::list(&book).is_empty());
    }
}
