use crate::internal::common::ids::JobId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AllocError {
    #[error("Cannot load resource graph: {0}")]
    GraphLoadError(String),
    #[error("Resource graph is already initialized")]
    AlreadyInitialized,
    #[error("Resource graph is not initialized")]
    NotInitialized,
    #[error("Context was destroyed")]
    ContextClosed,
    #[error("Invalid jobspec: {0}")]
    JobspecParseError(String),
    #[error("Unsatisfiable jobspec: {0}")]
    JobspecSemanticError(String),
    #[error("Unknown resource type '{0}'")]
    UnknownResourceType(String),
    #[error("Job {0} already exists")]
    DuplicateJobId(JobId),
    #[error("Insufficient resources: {0}")]
    InsufficientResources(String),
    #[error("Job {0} not found")]
    UnknownJobId(JobId),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::error::Error> for AllocError {
    fn from(e: serde_json::error::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}
