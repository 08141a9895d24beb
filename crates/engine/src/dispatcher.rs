//! Batch request dispatcher.
//!
//! `BatchDispatcher` runs one node over an ordered batch of items:
//! 1. Resolves the node's credential for each item.
//! 2. Calls `ExecutableNode::execute` with that item's parameters.
//! 3. Records either the response or a captured error, keeping input order.
//!
//! Items run strictly one after another. When `continue_on_fail` is off the
//! first failure aborts the batch and nothing is returned for it.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, instrument, warn};

use nodes::{
    AbacusAiChatNode, AbacusAiNode, CredentialStore, ExecutableNode, ExecutionContext,
    HttpTransport, NodeError,
};

use crate::{EngineError, InputItem, OutputRecord};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Policy knobs for a dispatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchConfig {
    /// Capture per-item failures as `{"error": ...}` records instead of
    /// aborting the batch.
    pub continue_on_fail: bool,
}

impl DispatchConfig {
    pub fn lenient() -> Self {
        Self {
            continue_on_fail: true,
        }
    }

    pub fn strict() -> Self {
        Self {
            continue_on_fail: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Node registry
// ---------------------------------------------------------------------------

/// Maps node names to boxed `ExecutableNode` implementations.
pub type NodeRegistry = HashMap<String, Arc<dyn ExecutableNode>>;

/// Registry holding both Abacus.AI nodes, optionally pointed at another host.
pub fn default_registry(base_url: Option<&str>) -> NodeRegistry {
    let nodes: Vec<Arc<dyn ExecutableNode>> = match base_url {
        Some(base) => vec![
            Arc::new(AbacusAiNode::with_base_url(base)),
            Arc::new(AbacusAiChatNode::with_base_url(base)),
        ],
        None => vec![Arc::new(AbacusAiNode::new()), Arc::new(AbacusAiChatNode::new())],
    };

    nodes
        .into_iter()
        .map(|node| (node.name().to_string(), node))
        .collect()
}

/// Look up a node by name.
pub fn resolve_node(
    registry: &NodeRegistry,
    name: &str,
) -> Result<Arc<dyn ExecutableNode>, EngineError> {
    registry
        .get(name)
        .cloned()
        .ok_or_else(|| EngineError::UnknownNodeType(name.to_string()))
}

// ---------------------------------------------------------------------------
// BatchDispatcher
// ---------------------------------------------------------------------------

/// Stateless orchestrator for batch runs.
///
/// Holds only read-only collaborators, so one dispatcher can serve any
/// number of batches.
pub struct BatchDispatcher {
    credentials: Arc<dyn CredentialStore>,
    transport: Arc<dyn HttpTransport>,
    config: DispatchConfig,
}

impl BatchDispatcher {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        transport: Arc<dyn HttpTransport>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            credentials,
            transport,
            config,
        }
    }

    /// Run `node` over `items` and return one record per item, in order.
    ///
    /// # Errors
    /// Returns [`EngineError::ItemFailed`] for the first failing item when
    /// `continue_on_fail` is off. Results already collected are discarded.
    #[instrument(
        skip_all,
        fields(
            execution_id = %uuid::Uuid::new_v4(),
            node = node.name(),
            items = items.len(),
            continue_on_fail = self.config.continue_on_fail,
        )
    )]
    pub async fn dispatch(
        &self,
        node: &dyn ExecutableNode,
        items: &[InputItem],
    ) -> Result<Vec<OutputRecord>, EngineError> {
        let mut output = Vec::with_capacity(items.len());
        let mut failed = 0usize;

        for (index, item) in items.iter().enumerate() {
            match self.execute_item(node, index, item).await {
                Ok(response) => output.push(OutputRecord::success(index, response)),

                Err(err) if self.config.continue_on_fail => {
                    warn!("item {} failed, continuing: {}", index, err);
                    failed += 1;
                    output.push(OutputRecord::error(index, err.to_string()));
                }

                Err(err) => {
                    error!("item {} failed, aborting batch: {}", index, err);
                    return Err(EngineError::ItemFailed { index, source: err });
                }
            }
        }

        info!(
            "batch finished: {} succeeded, {} failed",
            output.len() - failed,
            failed
        );

        Ok(output)
    }

    async fn execute_item(
        &self,
        node: &dyn ExecutableNode,
        index: usize,
        item: &InputItem,
    ) -> Result<Value, NodeError> {
        let credentials = self.credentials.get(node.credential_name()).await?;

        let ctx = ExecutionContext {
            item_index: index,
            credentials,
            transport: Arc::clone(&self.transport),
        };

        node.execute(&item.params, &ctx).await
    }
}

/// One-shot form of [`BatchDispatcher::dispatch`].
pub async fn dispatch(
    node: &dyn ExecutableNode,
    items: &[InputItem],
    credentials: Arc<dyn CredentialStore>,
    transport: Arc<dyn HttpTransport>,
    continue_on_fail: bool,
) -> Result<Vec<OutputRecord>, EngineError> {
    BatchDispatcher::new(credentials, transport, DispatchConfig { continue_on_fail })
        .dispatch(node, items)
        .await
}
