//! Task data structure.
//!
//! A `Task` is one to-do entry. Ids are numeric strings so the stored JSON
//! stays compatible with lists written by other clients.

use serde::{Deserialize, Serialize};

use crate::fields::Category;

/// A single to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub category: Category,
}

impl Task {
    /// Create an open task. `text` is stored as given; callers trim it.
    pub fn new(id: u64, text: impl Into<String>, category: Category) -> Self {
        Task {
            id: id.to_string(),
            text: text.into(),
            completed: false,
            category,
        }
    }

    /// Numeric value of the id, if it has one.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.trim().parse().ok()
    }
}
