//! Error types for status probes.

use crate::runtime::RuntimeError;
use thiserror::Error;

/// Errors that can occur while probing a single service.
///
/// None of these ever leave the aggregator: they are folded into the
/// service's [`super::HealthRecord`].
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    /// Probe did not finish within its deadline
    #[error("probe timed out after {0}ms")]
    Timeout(u64),

    /// Nothing is listening on the target port
    #[error("connection refused")]
    ConnectionRefused,

    /// Any other socket-level failure
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The container runtime could not be queried
    #[error("runtime query failed: {0}")]
    RuntimeQuery(#[from] RuntimeError),

    /// The probe task itself panicked or was cancelled
    #[error("probe task failed: {0}")]
    TaskFailed(String),
}
