//! Domain types representing income and expense categories.

use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// Classifies operations for reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub kind: EntryKind,
    pub name: String,
}

impl Category {
    pub fn new(id: CategoryId, kind: EntryKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
        }
    }
}

impl Identifiable for Category {
    fn id(&self) -> u64 {
        self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        format!("#{} {} ({})", self.id, self.name, self.kind)
    }
}
