//! The `ExecutableNode` trait — the contract every node must fulfil.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::credentials::AbacusAiApi;
use crate::transport::HttpTransport;
use crate::NodeError;

/// Per-item context passed to a node during execution.
///
/// Built by the dispatcher for each input item so the node never has to
/// look anything up by name.
#[derive(Clone)]
pub struct ExecutionContext {
    /// Position of the item in the batch.
    pub item_index: usize,
    /// Resolved credential for this node.
    pub credentials: AbacusAiApi,
    /// Outgoing HTTP.
    pub transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("item_index", &self.item_index)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// The core node trait.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Machine name used for registry lookup (e.g. `abacusAi`).
    fn name(&self) -> &'static str;

    /// Human-readable name.
    fn display_name(&self) -> &'static str;

    /// Name of the credential the dispatcher must resolve before `execute`.
    fn credential_name(&self) -> &'static str;

    /// Execute the node for one item: `params` holds that item's configured
    /// parameter values, the return value is the raw decoded response body.
    async fn execute(&self, params: &Value, ctx: &ExecutionContext) -> Result<Value, NodeError>;
}
