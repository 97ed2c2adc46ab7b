#![forbid(unsafe_code)]

pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

use crate::task::model::Task;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("task not found")]
    NotFound,

    #[error("{0}")]
    Unavailable(String),
}

/// External task source. The core assumes nothing about transport, retry,
/// or latency; only `MockTaskApi` ships.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, FetchError>;
}
