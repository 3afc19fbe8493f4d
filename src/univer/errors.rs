//! Error types for the portal client.

use crate::session::RefreshError;

#[derive(Debug, thiserror::Error)]
pub enum UniverError {
    /// A route template placeholder had no matching parameter. Programmer
    /// error at the call site, never retried.
    #[error("route template placeholder `{{{0}}}` has no matching parameter")]
    MalformedTemplate(String),
    /// The client was used after `shutdown()`.
    #[error("client is shut down")]
    Closed,
    /// Network-level failure (timeout, connection reset, protocol error).
    /// Propagated immediately; never treated as a challenge signal.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// A JSON response did not match the expected record shape.
    #[error("failed to parse response from {url}")]
    MalformedPayload {
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("session refresh failed")]
    Refresh(#[from] RefreshError),
}
