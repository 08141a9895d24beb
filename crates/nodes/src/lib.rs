//! `nodes` crate — the `ExecutableNode` trait and the Abacus.AI node implementations.
//!
//! Every node must implement [`ExecutableNode`]. The engine crate dispatches
//! batches through this trait object; HTTP goes through [`HttpTransport`] so
//! tests can swap in [`mock::MockTransport`].

pub mod abacus;
pub mod credentials;
pub mod error;
pub mod message;
pub mod mock;
pub mod payload;
pub mod traits;
pub mod transport;

pub use abacus::{AbacusAiChatNode, AbacusAiNode};
pub use credentials::{AbacusAiApi, CredentialStore, StaticCredentials};
pub use error::NodeError;
pub use message::{Message, Role};
pub use payload::{ChatOptions, ChatPayload};
pub use traits::{ExecutableNode, ExecutionContext};
pub use transport::{HttpRequest, HttpTransport, ReqwestTransport, TransportError};
