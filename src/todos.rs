//! In-memory task list mirrored to the repository.
//!
//! Every mutation computes a new list from the current one, swaps it into
//! memory, then writes the whole list back. A failed write leaves the
//! in-memory list updated and reports [`TodoError::Save`].

use tracing::{info, warn};

use crate::db::TaskRepository;
use crate::error::TodoError;
use crate::fields::Category;
use crate::task::Task;

/// Message shown when an add is rejected.
pub const BLANK_TASK_MESSAGE: &str = "Enter a valid task";

/// The current task list and its persistence.
pub struct TodoList {
    tasks: Vec<Task>,
    repo: TaskRepository,
}

impl TodoList {
    /// Empty list over `repo`. Call [`TodoList::load`] to populate it.
    pub fn new(repo: TaskRepository) -> Self {
        TodoList {
            tasks: Vec::new(),
            repo,
        }
    }

    /// Create a list and load the persisted snapshot into it.
    pub fn open(repo: TaskRepository) -> Result<Self, TodoError> {
        let mut list = Self::new(repo);
        list.load()?;
        Ok(list)
    }

    /// Replace the in-memory list with the persisted one.
    /// On failure the in-memory list is left as it was.
    pub fn load(&mut self) -> Result<(), TodoError> {
        self.tasks = self.repo.load().map_err(TodoError::Load)?;
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    #[cfg(test)]
    pub fn repository(&self) -> &TaskRepository {
        &self.repo
    }

    /// Add a task. Blank text is rejected without touching the list.
    /// The id is one past the largest id in the persisted snapshot.
    pub fn add(&mut self, text: &str, category: Category) -> Result<Task, TodoError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TodoError::Validation(BLANK_TASK_MESSAGE.to_string()));
        }
        let id = self
            .repo
            .next_id()
            .map_err(TodoError::Load)?
            .ok_or(TodoError::IdsExhausted)?;
        let task = Task::new(id, text, category);

        let mut updated = self.tasks.clone();
        updated.push(task.clone());
        self.replace(updated)?;
        info!(id = %task.id, category = task.category.label(), "added task");
        Ok(task)
    }

    /// Append several tasks in one write, assigning consecutive ids.
    pub fn add_many(&mut self, items: Vec<(String, Category)>) -> Result<Vec<Task>, TodoError> {
        let mut next = self.repo.next_id().map_err(TodoError::Load)?;
        let mut added = Vec::with_capacity(items.len());
        for (text, category) in items {
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let id = next.ok_or(TodoError::IdsExhausted)?;
            added.push(Task::new(id, text, category));
            next = id.checked_add(1);
        }
        if added.is_empty() {
            return Ok(added);
        }
        let mut updated = self.tasks.clone();
        updated.extend(added.iter().cloned());
        self.replace(updated)?;
        info!(count = added.len(), "appended tasks");
        Ok(added)
    }

    /// Flip the completion flag of `id`.
    /// Returns the new flag, or `None` (and no write) if the id is unknown.
    pub fn toggle(&mut self, id: &str) -> Result<Option<bool>, TodoError> {
        let Some(current) = self.get(id).map(|t| t.completed) else {
            return Ok(None);
        };
        let updated = self
            .tasks
            .iter()
            .map(|t| {
                if t.id == id {
                    Task {
                        completed: !t.completed,
                        ..t.clone()
                    }
                } else {
                    t.clone()
                }
            })
            .collect();
        self.replace(updated)?;
        info!(id, completed = !current, "toggled task");
        Ok(Some(!current))
    }

    /// Remove `id`. Returns `false` (and no write) if the id is unknown.
    pub fn delete(&mut self, id: &str) -> Result<bool, TodoError> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let updated = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        self.replace(updated)?;
        info!(id, "deleted task");
        Ok(true)
    }

    /// Remove every completed task. Returns how many were removed.
    pub fn clear_completed(&mut self) -> Result<usize, TodoError> {
        let updated: Vec<Task> = self.tasks.iter().filter(|t| !t.completed).cloned().collect();
        let removed = self.tasks.len() - updated.len();
        self.replace(updated)?;
        info!(removed, "cleared completed tasks");
        Ok(removed)
    }

    /// Remove every task. Returns how many were removed.
    pub fn clear_all(&mut self) -> Result<usize, TodoError> {
        let removed = self.tasks.len();
        self.replace(Vec::new())?;
        info!(removed, "cleared all tasks");
        Ok(removed)
    }

    fn replace(&mut self, updated: Vec<Task>) -> Result<(), TodoError> {
        self.tasks = updated;
        self.repo.save(&self.tasks).map_err(|e| {
            warn!(error = %e, "failed to persist task list");
            TodoError::Save(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FlakyStore, MemoryStore};

    fn list_with(texts: &[(&str, bool)]) -> (TodoList, FlakyStore) {
        let store = FlakyStore::default();
        let mut list = TodoList::new(TaskRepository::new(Box::new(store.clone())));
        for (text, done) in texts {
            let t = list.add(text, Category::Other).unwrap();
            if *done {
                list.toggle(&t.id).unwrap();
            }
        }
        (list, store)
    }

    fn persisted(store: &FlakyStore) -> Vec<Task> {
        TaskRepository::new(Box::new(store.clone())).load().unwrap()
    }

    #[test]
    fn test_add_assigns_next_id_and_persists() {
        let (mut list, store) = list_with(&[("a", false), ("b", false)]);
        let t = list.add("  c  ", Category::Work).unwrap();
        assert_eq!(t.id, "3");
        assert_eq!(t.text, "c");
        assert_eq!(list.len(), 3);
        assert_eq!(persisted(&store), list.tasks());
    }

    #[test]
    fn test_add_blank_is_rejected() {
        let (mut list, store) = list_with(&[("a", false)]);
        for blank in ["", "   ", "\t\n"] {
            let err = list.add(blank, Category::Home).unwrap_err();
            assert!(matches!(err, TodoError::Validation(_)));
        }
        assert_eq!(list.len(), 1);
        assert_eq!(persisted(&store).len(), 1);
    }

    #[test]
    fn test_add_scans_persisted_copy_not_memory() {
        let store = FlakyStore::default();
        let mut other = TaskRepository::new(Box::new(store.clone()));
        other
            .save(&[Task::new(41, "written elsewhere", Category::Other)])
            .unwrap();

        // In-memory list is still empty; id comes from storage.
        let mut list = TodoList::new(TaskRepository::new(Box::new(store.clone())));
        let t = list.add("mine", Category::Home).unwrap();
        assert_eq!(t.id, "42");
    }

    #[test]
    fn test_toggle_flips_only_target() {
        let (mut list, store) = list_with(&[("a", false), ("b", false), ("c", true)]);
        assert_eq!(list.toggle("2").unwrap(), Some(true));
        let flags: Vec<bool> = list.tasks().iter().map(|t| t.completed).collect();
        assert_eq!(flags, vec![false, true, true]);
        assert_eq!(list.toggle("2").unwrap(), Some(false));
        assert_eq!(persisted(&store), list.tasks());
    }

    #[test]
    fn test_toggle_unknown_is_noop() {
        let (mut list, store) = list_with(&[("a", false)]);
        store.fail_writes.set(true);
        assert_eq!(list.toggle("99").unwrap(), None);
    }

    #[test]
    fn test_delete_keeps_order() {
        let (mut list, store) = list_with(&[("a", false), ("b", false), ("c", false)]);
        assert!(list.delete("2").unwrap());
        let ids: Vec<&str> = list.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(!list.delete("2").unwrap());
        assert_eq!(persisted(&store), list.tasks());
    }

    #[test]
    fn test_clear_completed_removes_only_completed() {
        let (mut list, store) =
            list_with(&[("a", true), ("b", false), ("c", true), ("d", false)]);
        assert_eq!(list.clear_completed().unwrap(), 2);
        let texts: Vec<&str> = list.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "d"]);
        assert!(list.tasks().iter().all(|t| !t.completed));
        assert_eq!(persisted(&store), list.tasks());
    }

    #[test]
    fn test_clear_all_persists_empty() {
        let (mut list, store) = list_with(&[("a", true), ("b", false)]);
        assert_eq!(list.clear_all().unwrap(), 2);
        assert!(list.is_empty());
        assert!(persisted(&store).is_empty());
    }

    #[test]
    fn test_ids_keep_growing_after_delete() {
        let (mut list, _store) = list_with(&[("a", false), ("b", false)]);
        list.delete("2").unwrap();
        let t = list.add("c", Category::Other).unwrap();
        assert_eq!(t.id, "2");
        list.clear_all().unwrap();
        assert_eq!(list.add("d", Category::Other).unwrap().id, "1");
    }

    #[test]
    fn test_save_failure_keeps_memory_updated() {
        let (mut list, store) = list_with(&[("a", false)]);
        store.fail_writes.set(true);
        let err = list.delete("1").unwrap_err();
        assert!(matches!(err, TodoError::Save(_)));
        assert!(list.is_empty());
        assert_eq!(persisted(&store).len(), 1);
    }

    #[test]
    fn test_load_failure_leaves_list() {
        let (mut list, store) = list_with(&[("a", false)]);
        store.fail_reads.set(true);
        assert!(matches!(list.load(), Err(TodoError::Load(_))));
        assert_eq!(list.len(), 1);
        // Adding needs the persisted copy to pick an id.
        assert!(matches!(list.add("b", Category::Other), Err(TodoError::Load(_))));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_add_many_skips_blank_and_writes_once() {
        let repo = TaskRepository::new(Box::new(MemoryStore::new()));
        let mut list = TodoList::new(repo);
        let added = list
            .add_many(vec![
                ("one".into(), Category::Other),
                ("  ".into(), Category::Other),
                ("two".into(), Category::Other),
            ])
            .unwrap();
        let ids: Vec<&str> = added.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(list.repository().load().unwrap(), list.tasks());
    }

    fn list_ending_at(last_id: u64) -> (TodoList, FlakyStore) {
        let store = FlakyStore::default();
        TaskRepository::new(Box::new(store.clone()))
            .save(&[Task::new(last_id, "imported", Category::Other)])
            .unwrap();
        let list = TodoList::open(TaskRepository::new(Box::new(store.clone()))).unwrap();
        (list, store)
    }

    #[test]
    fn test_add_after_max_id_is_error() {
        let (mut list, store) = list_ending_at(u64::MAX);
        let err = list.add("new", Category::Home).unwrap_err();
        assert!(matches!(err, TodoError::IdsExhausted));
        assert_eq!(list.len(), 1);
        assert_eq!(persisted(&store).len(), 1);
    }

    #[test]
    fn test_add_many_stops_at_max_id() {
        let (mut list, store) = list_ending_at(u64::MAX - 1);
        let err = list
            .add_many(vec![("one".into(), Category::Other), ("two".into(), Category::Other)])
            .unwrap_err();
        assert!(matches!(err, TodoError::IdsExhausted));
        assert_eq!(list.len(), 1);
        assert_eq!(persisted(&store).len(), 1);

        let added = list.add_many(vec![("one".into(), Category::Other)]).unwrap();
        assert_eq!(added[0].id, u64::MAX.to_string());
    }

    #[test]
    fn test_open_reads_snapshot() {
        let store = FlakyStore::default();
        let mut first = TodoList::new(TaskRepository::new(Box::new(store.clone())));
        first.add("persisted", Category::Work).unwrap();
        let reopened = TodoList::open(TaskRepository::new(Box::new(store))).unwrap();
        assert_eq!(reopened.tasks(), first.tasks());
        assert_eq!(reopened.completed_count(), 0);
    }
}
