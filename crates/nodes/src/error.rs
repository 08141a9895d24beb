//! Node-level error type.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by a node's `execute` method.
///
/// The dispatcher does not distinguish between variants: in lenient mode
/// the `Display` string becomes the item's `{"error": ...}` record, in
/// strict mode the whole batch is aborted.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NodeError {
    /// A required parameter is missing or empty.
    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),

    /// A parameter is present but has an unusable value.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },

    /// The credential supplier could not produce the requested credential.
    #[error("credential error: {0}")]
    Credential(String),

    /// The HTTP call failed (network, non-2xx status, or body decode).
    #[error(transparent)]
    Transport(#[from] TransportError),
}
