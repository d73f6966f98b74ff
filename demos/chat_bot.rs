//! Chat bot with memory
//!
//! Keeps the whole conversation and writes it to `conversation_log.txt` when you type
//! `exit`.
//!
//! Run with: cargo run --example chat_bot
//!
//! Requires OPENAI_API_KEY in the environment or a `.env` file.

use std::sync::Arc;
use toolchat::agents::chat_bot::DEFAULT_LOG_PATH;
use toolchat::agents::{ChatBot, StdinInput, DEFAULT_MODEL};
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
    let mut bot = ChatBot::new(LlmBroker::new(DEFAULT_MODEL, gateway));

    bot.run(&mut StdinInput::new(), DEFAULT_LOG_PATH).await?;
    Ok(())
}
