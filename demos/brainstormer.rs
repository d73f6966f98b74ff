//! Brainstorming agent
//!
//! Suggests ideas, appends the ones you like to a document with the `update` tool and
//! ends the session once the document is saved with the `save` tool.
//!
//! Run with: cargo run --example brainstormer [output-directory]
//!
//! Requires OPENAI_API_KEY in the environment or a `.env` file.

use std::sync::Arc;
use toolchat::agents::{Brainstormer, BrainstormerOptions, StdinInput, DEFAULT_MODEL};
use toolchat::llm::gateways::{OpenAIConfig, OpenAIGateway};
use toolchat::llm::LlmBroker;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toolchat=info")),
        )
        .init();

    let options = BrainstormerOptions {
        save_directory: std::env::args().nth(1).map(Into::into),
        ..Default::default()
    };

    let gateway = Arc::new(OpenAIGateway::with_config(OpenAIConfig::from_env()?));
    let agent = Brainstormer::with_options(LlmBroker::new(DEFAULT_MODEL, gateway), options)?;

    agent.run(&mut StdinInput::new()).await?;
    Ok(())
}
