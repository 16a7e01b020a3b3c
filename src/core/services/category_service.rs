use crate::core::errors::EntityKind;
use crate::core::timing::timed;
use crate::domain::{Category, CategoryId, EntryKind};
use crate::ledger::Book;

use super::{normalize_name, ServiceResult};

pub struct CategoryService;

impl CategoryService {
    pub fn create(
        book: &mut Book,
        id: Option<CategoryId>,
        kind: EntryKind,
        name: &str,
    ) -> ServiceResult<Category> {
        let name = normalize_name(EntityKind::Category, name)?;
        let categories = &mut book.categories;
        let category = timed("category.create", || match id {
            Some(id) => categories.create(id, kind, name),
            None => categories.open(kind, name),
        })?;
        book.touch();
        tracing::info!(category = category.id, kind = %category.kind, "category created");
        Ok(category)
    }

    pub fn rename(book: &mut Book, id: CategoryId, name: &str) -> ServiceResult<()> {
        let name = normalize_name(EntityKind::Category, name)?;
        book.categories.rename(id, name)?;
        book.touch();
        Ok(())
    }

    pub fn delete(book: &mut Book, id: CategoryId) -> Option<Category> {
        let removed = book.categories.delete(id)?;
        book.touch();
        tracing::info!(category = id, "category deleted");
        Some(removed)
    }

    pub fn list(book: &Book) -> Vec<&Category> {
        book.categories.list().iter().collect()
    }
}
