//! Task persistence and table formatting.
//!
//! `TaskRepository` stores the whole task list as one JSON array under a
//! single key. There are no partial updates: every save replaces the
//! previous snapshot.

use tracing::{debug, warn};

use crate::error::StorageError;
use crate::storage::KeyValueStore;
use crate::task::Task;

/// Key under which the task list is stored.
pub const STORAGE_KEY: &str = "@todos";

/// Snapshot-style persistence for the task list.
pub struct TaskRepository {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl TaskRepository {
    /// Repository using the default storage key.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        TaskRepository {
            store,
            key: key.into(),
        }
    }

    /// Load the persisted list. A missing or blank value is an empty list.
    pub fn load(&self) -> Result<Vec<Task>, StorageError> {
        let Some(raw) = self.store.get_item(&self.key)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let tasks: Vec<Task> = serde_json::from_str(&raw).map_err(|e| {
            warn!(key = %self.key, error = %e, "stored task list is malformed");
            e
        })?;
        debug!(key = %self.key, count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    /// Replace the persisted list with `tasks`.
    pub fn save(&mut self, tasks: &[Task]) -> Result<(), StorageError> {
        let data = serde_json::to_string(tasks)?;
        self.store.set_item(&self.key, &data)?;
        debug!(key = %self.key, count = tasks.len(), "saved tasks");
        Ok(())
    }

    /// Next id: one past the largest numeric id in the *persisted* list.
    /// `None` once the largest id is `u64::MAX`.
    pub fn next_id(&self) -> Result<Option<u64>, StorageError> {
        Ok(next_id_after(&self.load()?))
    }
}

/// One past the largest numeric id in `tasks`; non-numeric ids are ignored.
pub fn next_id_after(tasks: &[Task]) -> Option<u64> {
    tasks.iter().filter_map(Task::numeric_id).max().unwrap_or(0).checked_add(1)
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[Task]) {
    println!("{:<5} {:<4} {:<8} {}", "ID", "Done", "Category", "Task");
    for t in tasks {
        println!(
            "{:<5} {:<4} {:<8} {}",
            truncate(&t.id, 5),
            if t.completed { "[x]" } else { "[ ]" },
            t.category.label(),
            t.text
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
