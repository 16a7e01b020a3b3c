use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::errors::{EntityKind, LedgerError, Result};
use crate::domain::{Category, CategoryId, EntryKind};

use super::sequence::IdSequence;

/// Insertion-ordered collection of categories.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryStore {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    sequence: IdSequence,
    #[serde(default)]
    retired: BTreeSet<CategoryId>,
}

impl CategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        id: CategoryId,
        kind: EntryKind,
        name: impl Into<String>,
    ) -> Result<Category> {
        if self.contains(id) || self.retired.contains(&id) {
            return Err(LedgerError::duplicate(EntityKind::Category, id));
        }
        let category = Category::new(id, kind, name);
        self.sequence.observe(id);
        self.categories.push(category.clone());
        Ok(category)
    }

    /// Creates a category under the next free id. Fails once every id is taken.
    pub fn open(&mut self, kind: EntryKind, name: impl Into<String>) -> Result<Category> {
        let id = self
            .sequence
            .allocate()
            .ok_or_else(|| LedgerError::duplicate(EntityKind::Category, u64::MAX))?;
        let category = Category::new(id, kind, name);
        self.categories.push(category.clone());
        Ok(category)
    }

    /// Renames a category; its kind never changes.
    pub fn rename(&mut self, id: CategoryId, name: impl Into<String>) -> Result<()> {
        let category = self
            .categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Category, id))?;
        category.name = name.into();
        Ok(())
    }

    pub fn delete(&mut self, id: CategoryId) -> Option<Category> {
        let index = self
            .categories
            .iter()
            .position(|category| category.id == id)?;
        self.retired.insert(id);
        Some(self.categories.remove(index))
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.get(id).is_some()
    }

    pub fn list(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
