use serde::{Deserialize, Serialize};

/// A feature row that currently passes.
///
/// Only the columns needed for change notifications are read; the rest of the
/// row (priority, phase) stays in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassingFeature {
    pub id: i64,
    pub category: String,
    pub name: String,
}

impl PassingFeature {
    /// Human-readable label used in notifications: `"{category} {name}"`,
    /// or just the name when the category is empty.
    pub fn label(&self) -> String {
        if self.category.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.category, self.name)
        }
    }
}
