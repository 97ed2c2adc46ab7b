#![forbid(unsafe_code)]

use serde::Serialize;

use crate::store::view::TaskStats;

/// Sample display-card records. The lead project tracks the store's actual
/// completion percentage; the rest are fixed demo data.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Project {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub progress: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub role: String,
    pub join_date: String,
}

#[must_use]
pub fn sample_projects(stats: TaskStats) -> Vec<Project> {
    vec![
        Project {
            id: 1,
            name: "Task Management System".to_owned(),
            description: "Full-stack application for managing tasks".to_owned(),
            progress: stats.completion_percent(),
        },
        Project {
            id: 2,
            name: "User Authentication Module".to_owned(),
            description: "Secure login and registration system".to_owned(),
            progress: 90,
        },
        Project {
            id: 3,
            name: "API Documentation".to_owned(),
            description: "Swagger documentation for all endpoints".to_owned(),
            progress: 60,
        },
    ]
}

#[must_use]
pub fn sample_profile() -> Profile {
    Profile {
        name: "John Doe".to_owned(),
        email: "john.doe@example.com".to_owned(),
        role: "Admin".to_owned(),
        join_date: "2024-01-15".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_project_tracks_completion_percent() {
        let stats = TaskStats {
            total: 4,
            completed: 1,
            pending: 2,
            in_progress: 1,
        };
        let projects = sample_projects(stats);
        assert_eq!(projects.len(), 3);
        assert_eq!(projects[0].progress, 25);
        assert_eq!(projects[1].progress, 90);
    }
}
