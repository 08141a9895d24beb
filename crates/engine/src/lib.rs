//! `engine` crate — batch data model and the batch request dispatcher.

pub mod dispatcher;
pub mod error;
pub mod models;

pub use dispatcher::{
    default_registry, dispatch, resolve_node, BatchDispatcher, DispatchConfig, NodeRegistry,
};
pub use error::EngineError;
pub use models::{InputItem, OutputRecord, PairedItem};
