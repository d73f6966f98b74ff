//! ReAct calculator agent
//!
//! Asks the model a multi-step arithmetic question; the model works it out by calling
//! the add, subtract, multiply and divide tools, and every message is printed.
//!
//! Run with: cargo run --example react
//!
//! Requires OPENAI_API_KEY in the environment or a `.env` file.

use std::sync::Arc;
use toolchat::agents::react_agent::DEMO_QUESTION;
use toolchat::agents::{render_message, ReactAgent, DEFAULT_MODEL};
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
    let agent = ReactAgent::new(LlmBroker::new(DEFAULT_MODEL, gateway))?;

    println!("\n\nWelcome to the ReAct Agent! \n");
    let history = agent.solve(DEMO_QUESTION).await?;
    for message in history.messages() {
        println!("{}", render_message(message));
    }
    println!("Thank you for using the ReAct Agent! \n");
    Ok(())
}
