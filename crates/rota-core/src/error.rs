//! Error types for the planner library.

use std::path::PathBuf;

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Comprehensive error type for all planner operations.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// A host fetch failed (transient, reported as a warning)
    #[error("Fetch error: {message}")]
    Fetch {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
    /// Object not found for the given identity
    #[error("Object with identity '{id}' not found")]
    NotFound { id: String },
    /// A host action failed or returned an unexpected result
    #[error("Action '{action}' failed: {reason}")]
    Action { action: String, reason: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating fetch errors with optional context.
pub struct FetchErrorBuilder {
    message: String,
}

impl FetchErrorBuilder {
    /// Create a new fetch error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source<E>(self, source: E) -> PlannerError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PlannerError::Fetch {
            message: self.message,
            source: Some(Box::new(source)),
        }
    }

    /// Build the error without an underlying source.
    pub fn build(self) -> PlannerError {
        PlannerError::Fetch {
            message: self.message,
            source: None,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> PlannerError {
        PlannerError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl PlannerError {
    /// Creates a builder for fetch errors.
    pub fn fetch(message: impl Into<String>) -> FetchErrorBuilder {
        FetchErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates an action failure for the named action.
    pub fn action(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Action {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error is an expected "object is gone" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Specialized extension trait for host fetch Results.
pub trait FetchResultExt<T> {
    /// Map host errors into a fetch failure with a message.
    fn fetch_context(self, message: &str) -> Result<T>;
}

impl<T, E> FetchResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn fetch_context(self, message: &str) -> Result<T> {
        self.map_err(|e| PlannerError::fetch(message).with_source(e))
    }
}

/// Result type alias for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;
