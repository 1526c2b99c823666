use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};
use thiserror::Error;
use tracing::warn;

use super::activity::Activities;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize activities: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Error from a store transaction: either the mutation refused to run or the
/// result could not be persisted.
#[derive(Error, Debug)]
pub enum UpdateError<E> {
    #[error(transparent)]
    Rejected(E),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub trait ActivityStore: Send + Sync {
    /// Reads every activity. Missing or unreadable storage yields an empty mapping.
    fn load(&self) -> Activities;

    /// Replaces the stored activities wholesale.
    fn save(&self, activities: &Activities) -> Result<(), StoreError>;

    /// Runs `mutation` against a fresh load and saves the result when it
    /// succeeds. Nothing is written when the mutation fails.
    fn update<T, E, F>(&self, mutation: F) -> Result<T, UpdateError<E>>
    where
        Self: Sized,
        F: FnOnce(&mut Activities) -> Result<T, E>;
}

pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles inside this process only.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActivityStore for JsonFileStore {
    fn load(&self) -> Activities {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "{} not found. Initializing with an empty activities mapping.",
                    self.path.display()
                );
                return Activities::new();
            }
            Err(e) => {
                warn!(
                    "Could not read {}: {}. Initializing with an empty activities mapping.",
                    self.path.display(),
                    e
                );
                return Activities::new();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(
                "{} contains malformed JSON ({}). Initializing with an empty activities mapping.",
                self.path.display(),
                e
            );
            Activities::new()
        })
    }

    fn save(&self, activities: &Activities) -> Result<(), StoreError> {
        let rendered = serde_json::to_string_pretty(activities)?;
        std::fs::write(&self.path, rendered).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn update<T, E, F>(&self, mutation: F) -> Result<T, UpdateError<E>>
    where
        F: FnOnce(&mut Activities) -> Result<T, E>,
    {
        // A poisoned lock guards no data, so keep going.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut activities = self.load();
        let result = mutation(&mut activities).map_err(UpdateError::Rejected)?;
        self.save(&activities)?;
        Ok(result)
    }
}
