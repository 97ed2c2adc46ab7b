#![forbid(unsafe_code)]

pub mod persist;
pub mod view;

use tracing::{debug, info, warn};

use crate::api::TaskSource;
use crate::store::persist::{Snapshot, SnapshotStorage};
use crate::store::view::TaskStats;
use crate::task::model::{StatusFilter, Task, TaskDraft, TaskPatch, now_rfc3339};

/// Owned task state container: the task sequence, display criteria, and the
/// simulated-fetch lifecycle flags. UI layers hold the store by reference,
/// so tests get isolated instances for free.
///
/// Every mutation runs to completion under `&mut self`; there is no way for
/// two actions on one store to interleave partway.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    filter: StatusFilter,
    search_query: String,
    loading: bool,
    error: Option<String>,
    storage: Option<SnapshotStorage>,
}

impl TaskStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct over a durable slot, repopulating tasks, filter, and search
    /// query from the prior snapshot if one exists.
    #[must_use]
    pub fn with_storage(storage: SnapshotStorage) -> Self {
        let mut store = Self::new();
        if let Some(snapshot) = storage.load() {
            debug!(tasks = snapshot.tasks.len(), "restored snapshot");
            store.tasks = snapshot.tasks;
            store.filter = snapshot.filter;
            store.search_query = snapshot.search_query;
        }
        store.storage = Some(storage);
        store
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current filtered view: status selection plus case-insensitive
    /// substring search, in insertion order.
    #[must_use]
    pub fn filtered_tasks(&self) -> Vec<&Task> {
        view::filtered_tasks(&self.tasks, self.filter, &self.search_query)
    }

    #[must_use]
    pub fn stats(&self) -> TaskStats {
        view::stats(&self.tasks)
    }

    /// Append a new task and return its assigned id.
    pub fn add_task(&mut self, draft: TaskDraft) -> String {
        let id = self.unique_id();
        debug!(id = %id, title = %draft.title, "add task");
        self.tasks.push(Task {
            id: id.clone(),
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            created_at: now_rfc3339(),
            updated_at: None,
        });
        self.persist();
        id
    }

    /// Merge a patch into the matching task. Returns false (and changes
    /// nothing) when the id is absent.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        task.updated_at = Some(now_rfc3339());
        debug!(id = %id, "update task");
        self.persist();
        true
    }

    /// Remove the matching task. Returns false when the id is absent.
    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            debug!(id = %id, "delete task");
            self.persist();
        }
        removed
    }

    /// Flip done/not-done on the matching task. Returns false when absent.
    pub fn toggle_task_status(&mut self, id: &str) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        task.status = task.status.toggled();
        task.updated_at = Some(now_rfc3339());
        debug!(id = %id, status = task.status.label(), "toggle task");
        self.persist();
        true
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
        self.persist();
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.persist();
    }

    /// Drop every completed task, preserving the order of the remainder.
    /// Returns the number removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks
            .retain(|t| t.status != crate::task::model::TaskStatus::Completed);
        let removed = before - self.tasks.len();
        if removed > 0 {
            debug!(removed, "clear completed");
            self.persist();
        }
        removed
    }

    /// Replace the task list from an external source. On failure the current
    /// tasks are kept and the message is recorded for the UI.
    ///
    /// The exclusive borrow held across the await means no other action on
    /// this store can run mid-fetch.
    pub async fn fetch_tasks<S: TaskSource + ?Sized>(&mut self, source: &S) {
        self.loading = true;
        self.error = None;
        match source.list_tasks().await {
            Ok(tasks) => {
                info!(count = tasks.len(), "fetched tasks");
                self.tasks = tasks;
                self.loading = false;
                self.persist();
            }
            Err(e) => {
                warn!(error = %e, "fetch failed");
                self.error = Some(e.to_string());
                self.loading = false;
            }
        }
    }

    /// Restore every state field to its initial default.
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.filter = StatusFilter::All;
        self.search_query.clear();
        self.loading = false;
        self.error = None;
        self.persist();
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            filter: self.filter,
            search_query: self.search_query.clone(),
        }
    }

    /// Best-effort write-through. Persistence failures degrade to in-memory
    /// operation rather than surfacing to the user.
    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(e) = storage.save(&self.snapshot()) {
            warn!(path = %storage.path().display(), error = %e, "failed to persist snapshot");
        }
    }

    /// Ids must stay unique across the store; regenerate on the rare
    /// collision of the short token.
    fn unique_id(&self) -> String {
        loop {
            let id = Task::new_id();
            if !self.tasks.iter().any(|t| t.id == id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTaskApi;
    use crate::task::model::{Priority, TaskStatus};
    use std::time::Duration;

    fn draft(title: &str, status: TaskStatus, priority: Priority) -> TaskDraft {
        TaskDraft {
            title: title.to_owned(),
            description: String::new(),
            status,
            priority,
        }
    }

    #[test]
    fn add_assigns_unique_ids_and_keeps_count() {
        let mut store = TaskStore::new();
        for i in 0..25 {
            store.add_task(draft(&format!("task {i}"), TaskStatus::Pending, Priority::Low));
        }
        assert_eq!(store.tasks().len(), 25);

        let mut ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 25);
    }

    #[test]
    fn update_merges_patch_and_stamps_updated_at() {
        let mut store = TaskStore::new();
        let id = store.add_task(draft("Old title", TaskStatus::Pending, Priority::Low));
        let created_at = store.task(&id).unwrap().created_at.clone();

        let ok = store.update_task(
            &id,
            TaskPatch {
                title: Some("New title".to_owned()),
                priority: Some(Priority::High),
                ..TaskPatch::default()
            },
        );
        assert!(ok);

        let task = store.task(&id).unwrap();
        assert_eq!(task.title, "New title");
        assert_eq!(task.priority, Priority::High);
        // Untouched by the patch.
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.created_at, created_at);
        assert!(task.updated_at.is_some());
    }

    #[test]
    fn update_missing_id_is_a_noop() {
        let mut store = TaskStore::new();
        store.add_task(draft("A", TaskStatus::Pending, Priority::Low));
        let before: Vec<Task> = store.tasks().to_vec();

        let ok = store.update_task(
            "nope",
            TaskPatch {
                title: Some("changed".to_owned()),
                ..TaskPatch::default()
            },
        );
        assert!(!ok);
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn delete_missing_id_leaves_tasks_unchanged() {
        let mut store = TaskStore::new();
        store.add_task(draft("A", TaskStatus::Pending, Priority::Low));
        let before: Vec<Task> = store.tasks().to_vec();

        assert!(!store.delete_task("missing"));
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn toggle_transitions_match_the_status_table() {
        let mut store = TaskStore::new();
        let pending = store.add_task(draft("p", TaskStatus::Pending, Priority::Low));
        let in_progress = store.add_task(draft("w", TaskStatus::InProgress, Priority::Low));
        let completed = store.add_task(draft("c", TaskStatus::Completed, Priority::Low));

        assert!(store.toggle_task_status(&pending));
        assert_eq!(store.task(&pending).unwrap().status, TaskStatus::Completed);

        assert!(store.toggle_task_status(&in_progress));
        assert_eq!(
            store.task(&in_progress).unwrap().status,
            TaskStatus::Completed
        );

        assert!(store.toggle_task_status(&completed));
        assert_eq!(store.task(&completed).unwrap().status, TaskStatus::Pending);

        assert!(!store.toggle_task_status("missing"));
    }

    #[test]
    fn clear_completed_removes_exactly_the_completed_subset() {
        let mut store = TaskStore::new();
        let a = store.add_task(draft("a", TaskStatus::Pending, Priority::Low));
        store.add_task(draft("b", TaskStatus::Completed, Priority::Low));
        let c = store.add_task(draft("c", TaskStatus::InProgress, Priority::Low));
        store.add_task(draft("d", TaskStatus::Completed, Priority::Low));

        assert_eq!(store.clear_completed(), 2);
        let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, [a.as_str(), c.as_str()]);

        // Nothing left to clear.
        assert_eq!(store.clear_completed(), 0);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut store = TaskStore::new();
        store.add_task(draft("a", TaskStatus::Pending, Priority::Low));
        store.set_filter(StatusFilter::Completed);
        store.set_search_query("query");

        store.reset();
        assert!(store.tasks().is_empty());
        assert_eq!(store.filter(), StatusFilter::All);
        assert_eq!(store.search_query(), "");
        assert!(!store.loading());
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn fetch_replaces_tasks_on_success() {
        let mut store = TaskStore::new();
        store.add_task(draft("local", TaskStatus::Pending, Priority::Low));

        let api = MockTaskApi::new(Duration::ZERO);
        store.fetch_tasks(&api).await;

        assert!(!store.loading());
        assert!(store.error().is_none());
        assert_eq!(store.tasks().len(), 5);
        assert!(store.tasks().iter().all(|t| t.title != "local"));
    }

    #[tokio::test]
    async fn fetch_failure_records_message_and_keeps_tasks() {
        let mut store = TaskStore::new();
        store.add_task(draft("local", TaskStatus::Pending, Priority::Low));

        let api = MockTaskApi::failing(Duration::ZERO, "backend unavailable");
        store.fetch_tasks(&api).await;

        assert!(!store.loading());
        assert_eq!(store.error(), Some("backend unavailable"));
        assert_eq!(store.tasks().len(), 1);
    }
}
