//! `abacus-nodes` CLI entry-point.
//!
//! Available sub-commands:
//! - `run`   — dispatch a batch of items from a JSON file through a node.
//! - `nodes` — list the registered node types.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use engine::{default_registry, resolve_node, BatchDispatcher, DispatchConfig, InputItem};
use nodes::{ReqwestTransport, StaticCredentials};

#[derive(Parser)]
#[command(
    name = "abacus-nodes",
    about = "Run Abacus.AI chat nodes over batches of items",
    version
)]
struct Cli {
    /// Override the API host (e.g. for a proxy or local mock server).
    #[arg(long, env = "ABACUS_BASE_URL", global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dispatch every item in a JSON array file and print the output records.
    Run {
        /// Node type to execute (`abacusAi` or `abacusAiChat`).
        #[arg(long, default_value = "abacusAiChat")]
        node: String,
        /// Path to a JSON array of per-item parameter objects.
        #[arg(long)]
        input: PathBuf,
        /// Record per-item failures instead of aborting the batch.
        #[arg(long)]
        continue_on_fail: bool,
        #[arg(long, env = "ABACUS_API_KEY", hide_env_values = true)]
        api_key: String,
    },
    /// List registered node types.
    Nodes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = default_registry(cli.base_url.as_deref());

    match cli.command {
        Command::Run { node, input, continue_on_fail, api_key } => {
            let node = resolve_node(&registry, &node)?;

            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("cannot read input file {}", input.display()))?;
            let items: Vec<InputItem> = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a JSON array of items", input.display()))?;

            if api_key.trim().is_empty() {
                bail!("an API key is required (--api-key or ABACUS_API_KEY)");
            }

            info!("dispatching {} items through '{}'", items.len(), node.name());

            let dispatcher = BatchDispatcher::new(
                Arc::new(StaticCredentials::abacus(api_key)),
                Arc::new(ReqwestTransport::new()),
                DispatchConfig { continue_on_fail },
            );
            let output = dispatcher.dispatch(node.as_ref(), &items).await?;

            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Nodes => {
            let mut names: Vec<_> = registry.values().collect();
            names.sort_by_key(|n| n.name());
            for node in names {
                println!("{:<14} {}", node.name(), node.display_name());
            }
        }
    }

    Ok(())
}
