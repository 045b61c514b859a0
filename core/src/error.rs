//! Error types for robodash.
//!
//! Every fallible operation in the core returns [`Result`]. The surfaces use
//! [`Error::is_validation`] and [`Error::is_not_found`] to decide how a failure
//! is shown to the user; none of these errors is meant to end the process.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // === User input ===
    /// A required field was empty or malformed. Nothing was mutated.
    #[error("{message}")]
    Validation { message: String },

    /// The robot id does not exist (anymore).
    #[error("robot '{id}' not found")]
    RobotNotFound { id: String },

    /// The task index does not resolve to a task in the current view.
    #[error("task #{index} not found")]
    TaskNotFound { index: usize },

    // === Persistence ===
    /// A persisted value could not be parsed. Recovered by `DataStore::load`.
    #[error("stored '{key}' is unreadable: {source}")]
    PersistenceRead {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not determine home directory")]
    HomeDirUnavailable,

    #[error("failed to create data directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Configuration ===
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    #[error("invalid configuration: {message}")]
    ConfigValidation { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn robot_not_found(id: impl Into<String>) -> Self {
        Self::RobotNotFound { id: id.into() }
    }

    /// Empty required field, malformed date and the like.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RobotNotFound { .. } | Self::TaskNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_is_the_bare_message() {
        let err = Error::validation("Robot name is required");
        assert_eq!(err.to_string(), "Robot name is required");
        assert!(err.is_validation());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_predicates() {
        assert!(Error::robot_not_found("robot9").is_not_found());
        assert!(Error::TaskNotFound { index: 4 }.is_not_found());
        assert_eq!(
            Error::robot_not_found("robot9").to_string(),
            "robot 'robot9' not found"
        );
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_persistence_read_mentions_key() {
        let source = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        let err = Error::PersistenceRead {
            key: "robots".to_string(),
            source,
        };
        assert!(err.to_string().contains("robots"));
    }
}
