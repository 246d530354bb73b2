//! Error taxonomy for alert rule service calls

use thiserror::Error;

/// Failure of a single call against the alert rule service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service could not be reached at the transport level. Carries no
    /// status code; callers surface it as a generic failure.
    #[error("failed to reach the alert service: {0}")]
    Transport(String),

    /// The service answered with a non-success status. `detail` comes from
    /// the response body's `detail` field when the body is JSON.
    #[error("alert service rejected the request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// The service signalled success but the body was unusable, for example
    /// a created rule missing its identifier.
    #[error("unexpected alert service response: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Status code of the remote rejection, if this was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the service reported that the target rule does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
