#![forbid(unsafe_code)]

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{FetchError, TaskSource};
use crate::task::model::{Priority, Task, TaskDraft, TaskPatch, TaskStatus, now_rfc3339};

/// Locally synthesized task source with a simulated network delay. Stands in
/// for a backend; every operation works against an in-memory sample set.
#[derive(Debug)]
pub struct MockTaskApi {
    delay: Duration,
    failure: Option<String>,
    tasks: Mutex<Vec<Task>>,
}

impl MockTaskApi {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            failure: None,
            tasks: Mutex::new(sample_tasks()),
        }
    }

    /// A source whose every operation fails with the given message.
    #[must_use]
    pub fn failing(delay: Duration, message: impl Into<String>) -> Self {
        Self {
            delay,
            failure: Some(message.into()),
            tasks: Mutex::new(Vec::new()),
        }
    }

    async fn simulate(&self) -> Result<(), FetchError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.failure {
            Some(msg) => Err(FetchError::Unavailable(msg.clone())),
            None => Ok(()),
        }
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, Vec<Task>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, FetchError> {
        self.simulate().await?;
        self.guard()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(FetchError::NotFound)
    }

    pub async fn create_task(&self, draft: TaskDraft) -> Result<Task, FetchError> {
        self.simulate().await?;
        let task = Task {
            id: Task::new_id(),
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            created_at: now_rfc3339(),
            updated_at: None,
        };
        self.guard().push(task.clone());
        Ok(task)
    }

    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task, FetchError> {
        self.simulate().await?;
        let mut tasks = self.guard();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(FetchError::NotFound)?;
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
        Ok(task.clone())
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), FetchError> {
        self.simulate().await?;
        let mut tasks = self.guard();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(FetchError::NotFound);
        }
        Ok(())
    }

    pub async fn search_tasks(&self, query: &str) -> Result<Vec<Task>, FetchError> {
        self.simulate().await?;
        let needle = query.to_lowercase();
        Ok(self
            .guard()
            .iter()
            .filter(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TaskSource for MockTaskApi {
    async fn list_tasks(&self) -> Result<Vec<Task>, FetchError> {
        self.simulate().await?;
        Ok(self.guard().clone())
    }
}

fn sample_task(
    id: &str,
    title: &str,
    description: &str,
    status: TaskStatus,
    priority: Priority,
) -> Task {
    Task {
        id: id.to_owned(),
        title: title.to_owned(),
        description: description.to_owned(),
        status,
        priority,
        created_at: now_rfc3339(),
        updated_at: None,
    }
}

fn sample_tasks() -> Vec<Task> {
    vec![
        sample_task(
            "1",
            "Implement authentication",
            "Add JWT authentication to the backend",
            TaskStatus::InProgress,
            Priority::High,
        ),
        sample_task(
            "2",
            "Design database schema",
            "Create ER diagram for the project",
            TaskStatus::Completed,
            Priority::Medium,
        ),
        sample_task(
            "3",
            "Write unit tests",
            "Cover all service layers with tests",
            TaskStatus::Pending,
            Priority::High,
        ),
        sample_task(
            "4",
            "Deploy to production",
            "Setup CI/CD pipeline",
            TaskStatus::Pending,
            Priority::Medium,
        ),
        sample_task(
            "5",
            "Document API",
            "Create Swagger documentation",
            TaskStatus::InProgress,
            Priority::Low,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_yields_the_sample_set() {
        let api = MockTaskApi::new(Duration::ZERO);
        let tasks = api.list_tasks().await.expect("list");
        assert_eq!(tasks.len(), 5);
        assert_eq!(tasks[0].title, "Implement authentication");
    }

    #[tokio::test]
    async fn failing_source_reports_its_message() {
        let api = MockTaskApi::failing(Duration::ZERO, "synthetic outage");
        let err = api.list_tasks().await.expect_err("must fail");
        assert_eq!(err, FetchError::Unavailable("synthetic outage".to_owned()));
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let api = MockTaskApi::new(Duration::ZERO);
        assert_eq!(api.get_task("999").await, Err(FetchError::NotFound));
        assert!(api.get_task("2").await.is_ok());
    }

    #[tokio::test]
    async fn create_appends_to_the_sample_set() {
        let api = MockTaskApi::new(Duration::ZERO);
        let created = api
            .create_task(TaskDraft {
                title: "New task".to_owned(),
                ..TaskDraft::default()
            })
            .await
            .expect("create");

        let tasks = api.list_tasks().await.expect("list");
        assert_eq!(tasks.len(), 6);
        assert!(tasks.iter().any(|t| t.id == created.id));
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() {
        let api = MockTaskApi::new(Duration::ZERO);
        let updated = api
            .update_task(
                "3",
                TaskPatch {
                    status: Some(TaskStatus::Completed),
                    ..TaskPatch::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.status, TaskStatus::Completed);
        assert!(updated.updated_at.is_some());

        api.delete_task("3").await.expect("delete");
        assert_eq!(api.delete_task("3").await, Err(FetchError::NotFound));
        assert_eq!(api.list_tasks().await.expect("list").len(), 4);
    }

    #[tokio::test]
    async fn search_matches_title_and_description() {
        let api = MockTaskApi::new(Duration::ZERO);
        let hits = api.search_tasks("swagger").await.expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "5");

        let hits = api.search_tasks("auth").await.expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");
    }
}
