//! Stateless bot
//!
//! Answers one message, or keeps answering until you type `exit`. The model never sees
//! earlier turns.
//!
//! Run with: cargo run --example simple_bot
//!
//! Requires OPENAI_API_KEY in the environment or a `.env` file.

use std::sync::Arc;
use toolchat::agents::{ChatMode, InputSource, SimpleBot, StdinInput, DEFAULT_MODEL};
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

    let gateway = Arc::new(OpenAIGateway::with_config(OpenAIConfig::from_env()?));
    let bot = SimpleBot::new(LlmBroker::new(DEFAULT_MODEL, gateway));

    let mut input = StdinInput::new();
    let choice = input
        .next_line("Choose chat mode:\n1. Single message\n2. Continuous chat (type 'exit' to quit)\n> ")?
        .unwrap_or_default();
    let mode = ChatMode::from_choice(&choice)?;

    bot.run(mode, &mut input).await?;
    Ok(())
}
