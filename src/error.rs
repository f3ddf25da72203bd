//! Error types shared by storage, seeding and list mutations.
//!
//! Every failure the user can see falls into one of three kinds: storage,
//! network or validation. [`TodoError::alert`] turns an error into the text
//! shown in the alert modal.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading or writing the key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed task data: {0}")]
    Json(#[from] serde_json::Error),
}

/// User-facing failure of a list operation.
#[derive(Debug, Error)]
pub enum TodoError {
    #[error("failed to load tasks: {0}")]
    Load(#[source] StorageError),
    #[error("failed to save tasks: {0}")]
    Save(#[source] StorageError),
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{0}")]
    Validation(String),
    #[error("no task id left after {}", u64::MAX)]
    IdsExhausted,
}

/// Title and body of an alert modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Alert {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl TodoError {
    pub fn network(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        TodoError::Network {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Short alert for the user; the full chain goes to the log.
    pub fn alert(&self) -> Alert {
        match self {
            TodoError::Load(_) => Alert::new("Error", "Failed to load tasks"),
            TodoError::Save(_) => Alert::new("Error", "Failed to save tasks"),
            TodoError::Network { .. } => Alert::new("Error", "Failed to load tasks from the API"),
            TodoError::Validation(msg) => Alert::new("Error", msg.clone()),
            TodoError::IdsExhausted => Alert::new("Error", "No task ids left"),
        }
    }
}
