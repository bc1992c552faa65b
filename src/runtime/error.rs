//! Error types for container runtime access.

use thiserror::Error;

/// Errors reported by a [`super::ContainerRuntime`] implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuntimeError {
    /// The runtime daemon could not be reached at all
    #[error("container runtime unavailable: {0}")]
    Unavailable(String),

    /// Request did not complete within the client timeout
    #[error("runtime request timed out after {0}s")]
    Timeout(u64),

    /// The runtime does not know the referenced container
    #[error("no such container: {0}")]
    NoSuchContainer(String),

    /// Any other failed runtime request
    #[error("runtime request failed: {0}")]
    Request(String),
}

impl From<bollard::errors::Error> for RuntimeError {
    fn from(e: bollard::errors::Error) -> Self {
        use bollard::errors::Error as BollardError;

        match e {
            BollardError::DockerResponseServerError {
                status_code: 404,
                message,
            } => RuntimeError::NoSuchContainer(message),
            BollardError::SocketNotFoundError(path) => {
                RuntimeError::Unavailable(format!("socket not found: {}", path))
            }
            other => RuntimeError::Request(other.to_string()),
        }
    }
}
