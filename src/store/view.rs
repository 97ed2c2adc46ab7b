#![forbid(unsafe_code)]

use serde::Serialize;

use crate::task::model::{StatusFilter, Task, TaskStatus};

/// Filtered view of a task slice. Selection by status first, then a
/// case-insensitive substring match of the query against title or
/// description. Relative order of the input is preserved.
#[must_use]
pub fn filtered_tasks<'a>(tasks: &'a [Task], filter: StatusFilter, query: &str) -> Vec<&'a Task> {
    let query = query.trim().to_lowercase();
    tasks
        .iter()
        .filter(|t| filter.matches(t.status))
        .filter(|t| {
            query.is_empty()
                || t.title.to_lowercase().contains(&query)
                || t.description.to_lowercase().contains(&query)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
}

impl TaskStats {
    /// Share of completed tasks, rounded. 0 for an empty collection.
    #[must_use]
    pub fn completion_percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = (self.completed as f64 / self.total as f64) * 100.0;
        pct.round() as u8
    }
}

#[must_use]
pub fn stats(tasks: &[Task]) -> TaskStats {
    let mut out = TaskStats {
        total: tasks.len(),
        ..TaskStats::default()
    };
    for t in tasks {
        match t.status {
            TaskStatus::Completed => out.completed += 1,
            TaskStatus::Pending => out.pending += 1,
            TaskStatus::InProgress => out.in_progress += 1,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::model::{Priority, now_rfc3339};

    fn task(id: &str, title: &str, description: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_owned(),
            title: title.to_owned(),
            description: description.to_owned(),
            status,
            priority: Priority::Medium,
            created_at: now_rfc3339(),
            updated_at: None,
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            task(
                "1",
                "Implement authentication",
                "Add JWT authentication to the backend",
                TaskStatus::InProgress,
            ),
            task(
                "2",
                "Design schema",
                "Create ER diagram for the project",
                TaskStatus::Completed,
            ),
            task(
                "3",
                "Write unit tests",
                "Cover all service layers with tests",
                TaskStatus::Pending,
            ),
        ]
    }

    #[test]
    fn all_filter_with_empty_query_is_identity() {
        let tasks = sample();
        let out = filtered_tasks(&tasks, StatusFilter::All, "");
        assert_eq!(out.len(), tasks.len());
        for (got, want) in out.iter().zip(tasks.iter()) {
            assert_eq!(*got, want);
        }
    }

    #[test]
    fn status_filter_selects_exact_subset() {
        let tasks = sample();
        let out = filtered_tasks(&tasks, StatusFilter::Completed, "");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "2");

        let out = filtered_tasks(&tasks, StatusFilter::Pending, "");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "3");
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let tasks = sample();

        let out = filtered_tasks(&tasks, StatusFilter::All, "auth");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Implement authentication");

        // "diagram" only appears in a description.
        let out = filtered_tasks(&tasks, StatusFilter::All, "DIAGRAM");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "2");
    }

    #[test]
    fn filter_and_search_compose_and_preserve_order() {
        let mut tasks = sample();
        tasks.push(task(
            "4",
            "Document auth flows",
            "",
            TaskStatus::InProgress,
        ));

        let out = filtered_tasks(&tasks, StatusFilter::InProgress, "auth");
        let ids: Vec<&str> = out.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1", "4"]);
    }

    #[test]
    fn repeated_evaluation_is_deterministic() {
        let tasks = sample();
        let a = filtered_tasks(&tasks, StatusFilter::All, "e");
        let b = filtered_tasks(&tasks, StatusFilter::All, "e");
        assert_eq!(a, b);
    }

    #[test]
    fn stats_counts_partition_the_collection() {
        let tasks = sample();
        let s = stats(&tasks);
        assert_eq!(s.total, 3);
        assert_eq!(s.completed + s.pending + s.in_progress, s.total);
        assert_eq!(s.completed, 1);
        assert_eq!(s.pending, 1);
        assert_eq!(s.in_progress, 1);
    }

    #[test]
    fn stats_scenario_two_tasks() {
        let tasks = vec![
            task("a", "A", "", TaskStatus::Pending),
            task("b", "B", "", TaskStatus::Completed),
        ];
        let s = stats(&tasks);
        assert_eq!(
            s,
            TaskStats {
                total: 2,
                completed: 1,
                pending: 1,
                in_progress: 0
            }
        );

        let out = filtered_tasks(&tasks, StatusFilter::parse("completed"), "");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "B");
    }

    #[test]
    fn completion_percent_rounds_and_handles_empty() {
        assert_eq!(TaskStats::default().completion_percent(), 0);
        let s = TaskStats {
            total: 3,
            completed: 2,
            pending: 1,
            in_progress: 0,
        };
        assert_eq!(s.completion_percent(), 67);
    }
}
