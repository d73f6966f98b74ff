//! # toolchat
//!
//! Console LLM agents built around one tool-calling conversation loop.
//!
//! The [`llm`] module talks to an OpenAI-compatible chat completions API and defines
//! the tools a model can call. The [`agents`] module drives conversations: a stateless
//! bot, a chat bot with memory, a calculator ReAct agent, a brainstormer that edits and
//! saves a document, and a retrieval-augmented agent.
//!
//! ```no_run
//! use std::sync::Arc;
//! use toolchat::agents::{ReactAgent, DEFAULT_MODEL};
//! use toolchat::llm::gateways::{OpenAIConfig, OpenAIGateway};
//! use toolchat::llm::LlmBroker;
//!
//! # async fn demo() -> toolchat::Result<()> {
//! let gateway = Arc::new(OpenAIGateway::with_config(OpenAIConfig::from_env()?));
//! let agent = ReactAgent::new(LlmBroker::new(DEFAULT_MODEL, gateway))?;
//! let history = agent.solve("What is 2 + 4?").await?;
//! println!("{}", history.last().map(|m| m.text()).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod error;
pub mod llm;

pub use error::{Result, ToolchatError};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agents::{
        ConversationLoop, InputSource, Route, StdinInput, Termination, DEFAULT_MODEL,
    };
    pub use crate::error::{Result, ToolchatError};
    pub use crate::llm::gateways::{OpenAIConfig, OpenAIGateway};
    pub use crate::llm::tools::{FunctionDescriptor, LlmTool, ToolDescriptor, ToolOutput, ToolRegistry};
    pub use crate::llm::{
        CompletionConfig, ConversationHistory, LlmBroker, LlmGateway, LlmMessage, MessageRole,
    };
}
