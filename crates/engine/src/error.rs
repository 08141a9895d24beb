//! Engine-level error types.

use nodes::NodeError;
use thiserror::Error;

/// Errors produced by the batch dispatcher and the node registry.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An item failed while `continue_on_fail` was off; the batch is aborted
    /// and no output is returned.
    #[error("item {index} failed: {source}")]
    ItemFailed {
        index: usize,
        #[source]
        source: NodeError,
    },

    /// No node is registered under the requested name.
    #[error("no implementation registered for node type '{0}'")]
    UnknownNodeType(String),
}
