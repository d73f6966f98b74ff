//! Retrieval-augmented agent
//!
//! Answers questions about a plain-text corpus. Passages are separated by blank lines,
//! embedded once at startup, and the model fetches the closest matches through
//! `retriever_tool`.
//!
//! Run with: cargo run --example rag -- <corpus.txt>
//!
//! The corpus path may also be set with RAG_CORPUS_PATH. RAG_EMBEDDING_MODEL overrides
//! the embedding model, and RAG_RETRIEVER=terms ranks by shared terms instead of
//! embeddings. Requires OPENAI_API_KEY in the environment or a `.env` file.

use anyhow::Context;
use std::sync::Arc;
use toolchat::agents::{RagAgent, StdinInput, DEFAULT_MODEL};
use toolchat::llm::gateways::{OpenAIConfig, OpenAIGateway};
use toolchat::llm::tools::retriever_tool::{
    load_passages, EmbeddingRetriever, PassageRetriever, Retriever,
};
use toolchat::llm::{LlmBroker, LlmGateway};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toolchat=info")),
        )
        .init();

    let corpus_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("RAG_CORPUS_PATH").ok())
        .context("usage: rag <corpus.txt> (or set RAG_CORPUS_PATH)")?;
    let passages = load_passages(&corpus_path)?;

    let gateway: Arc<dyn LlmGateway> =
        Arc::new(OpenAIGateway::with_config(OpenAIConfig::from_env()?));

    let retriever: Arc<dyn Retriever> = match std::env::var("RAG_RETRIEVER").as_deref() {
        Ok("terms") => Arc::new(PassageRetriever::new(passages)),
        _ => {
            let model = std::env::var("RAG_EMBEDDING_MODEL").ok();
            let retriever = EmbeddingRetriever::build(gateway.clone(), passages, model).await?;
            info!("Embedded {} passages from {}", retriever.len(), corpus_path);
            Arc::new(retriever)
        }
    };

    let mut agent = RagAgent::new(LlmBroker::new(DEFAULT_MODEL, gateway), retriever)?;

    agent.run(&mut StdinInput::new()).await?;
    Ok(())
}
