//! Abacus.AI chat nodes.
//!
//! Two node types hit two different endpoints:
//! - [`AbacusAiNode`]: a specific deployment,
//!   `POST {base}/v0/deployments/{deploymentId}/chat`.
//! - [`AbacusAiChatNode`]: the RouteLLM completions API,
//!   `POST {base}/v1/route-llm/chat/completions`.

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::credentials::ABACUS_AI_API;
use crate::payload::{ChatOptions, ChatPayload};
use crate::traits::ExecutionContext;
use crate::transport::chat_request;
use crate::{ExecutableNode, NodeError};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.abacus.ai";

/// Model used by [`AbacusAiChatNode`] when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

fn parse_params<T: DeserializeOwned>(params: &Value) -> Result<T, NodeError> {
    // A missing parameter object means "all defaults".
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params.clone()
    };

    serde_json::from_value(params).map_err(|e| NodeError::InvalidParameter {
        name: "parameters",
        reason: e.to_string(),
    })
}

fn trimmed_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

// ---------------------------------------------------------------------------
// Deployment chat
// ---------------------------------------------------------------------------

/// Parameters of the deployment chat node, as configured per item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentChatParams {
    #[serde(default = "default_operation")]
    pub operation: String,
    /// Deployment ID or deployment token.
    #[serde(default)]
    pub deployment_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub options: ChatOptions,
}

fn default_operation() -> String {
    "chat".to_string()
}

impl DeploymentChatParams {
    /// Parse and validate one item's parameters.
    pub fn from_value(params: &Value) -> Result<Self, NodeError> {
        let parsed: Self = parse_params(params)?;

        if parsed.operation != "chat" {
            return Err(NodeError::InvalidParameter {
                name: "operation",
                reason: format!("unsupported operation '{}'", parsed.operation),
            });
        }
        if parsed.deployment_id.trim().is_empty() {
            return Err(NodeError::MissingParameter("deploymentId"));
        }
        if parsed.message.trim().is_empty() {
            return Err(NodeError::MissingParameter("message"));
        }
        parsed.options.validate()?;

        Ok(parsed)
    }
}

/// Sends a chat message to a specific Abacus.AI deployment.
#[derive(Debug, Clone)]
pub struct AbacusAiNode {
    base_url: String,
}

impl Default for AbacusAiNode {
    fn default() -> Self {
        Self::new()
    }
}

impl AbacusAiNode {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the node at a different host (proxy, local mock server).
    pub fn with_base_url(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: trimmed_base(base_url.as_ref()),
        }
    }

    /// Chat URL for a deployment. The id is trimmed and sent as a single
    /// percent-encoded path segment.
    pub fn endpoint(&self, deployment_id: &str) -> Result<String, NodeError> {
        let invalid_base = |reason: String| NodeError::InvalidParameter {
            name: "baseUrl",
            reason,
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid_base(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid_base(format!("'{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(["v0", "deployments", deployment_id.trim(), "chat"]);

        Ok(url.into())
    }
}

#[async_trait]
impl ExecutableNode for AbacusAiNode {
    fn name(&self) -> &'static str {
        "abacusAi"
    }

    fn display_name(&self) -> &'static str {
        "Abacus AI"
    }

    fn credential_name(&self) -> &'static str {
        ABACUS_AI_API
    }

    async fn execute(&self, params: &Value, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        let params = DeploymentChatParams::from_value(params)?;
        let payload = ChatPayload::new(None, &params.message, &params.options);

        debug!(
            item = ctx.item_index,
            messages = payload.messages.len(),
            "sending deployment chat request"
        );

        let request = chat_request(
            self.endpoint(&params.deployment_id)?,
            &ctx.credentials.api_key,
            &payload,
        )?;
        Ok(ctx.transport.send(request).await?)
    }
}

// ---------------------------------------------------------------------------
// RouteLLM chat completions
// ---------------------------------------------------------------------------

/// Parameters of the RouteLLM chat node, as configured per item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLlmParams {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub options: ChatOptions,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl RouteLlmParams {
    pub fn from_value(params: &Value) -> Result<Self, NodeError> {
        let parsed: Self = parse_params(params)?;

        if parsed.model.trim().is_empty() {
            return Err(NodeError::MissingParameter("model"));
        }
        parsed.options.validate()?;

        Ok(parsed)
    }
}

/// Sends a prompt through the RouteLLM chat-completions API.
#[derive(Debug, Clone)]
pub struct AbacusAiChatNode {
    base_url: String,
}

impl Default for AbacusAiChatNode {
    fn default() -> Self {
        Self::new()
    }
}

impl AbacusAiChatNode {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: trimmed_base(base_url.as_ref()),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/route-llm/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ExecutableNode for AbacusAiChatNode {
    fn name(&self) -> &'static str {
        "abacusAiChat"
    }

    fn display_name(&self) -> &'static str {
        "Abacus.ai Chat Model"
    }

    fn credential_name(&self) -> &'static str {
        ABACUS_AI_API
    }

    async fn execute(&self, params: &Value, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        let params = RouteLlmParams::from_value(params)?;
        let payload = ChatPayload::new(Some(params.model), &params.prompt, &params.options);

        debug!(
            item = ctx.item_index,
            model = payload.model.as_deref().unwrap_or_default(),
            "sending route-llm completion request"
        );

        let request = chat_request(self.endpoint(), &ctx.credentials.api_key, &payload)?;
        Ok(ctx.transport.send(request).await?)
    }
}
