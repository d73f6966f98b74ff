//! Console agents built on the tool-calling conversation loop.
//!
//! # Agents
//!
//! - [`SimpleBot`] - stateless single-message bot
//! - [`ChatBot`] - chat with memory and a conversation log
//! - [`ReactAgent`] - calculator tools, loops while the model requests tools
//! - [`Brainstormer`] - edits and saves a shared document, ends once it is saved
//! - [`RagAgent`] - answers from passages fetched by a retriever tool
//!
//! Every agent reads user turns through an [`InputSource`], so sessions can be
//! scripted in tests.

pub mod brainstormer;
pub mod chat_bot;
pub mod conversation_loop;
pub mod input;
pub mod rag_agent;
pub mod react_agent;
pub mod simple_bot;

#[cfg(test)]
pub(crate) mod testing;

pub use brainstormer::{Brainstormer, BrainstormerOptions};
pub use chat_bot::ChatBot;
pub use conversation_loop::{ConversationLoop, ConversationLoopBuilder, Route, StepOutcome, Termination};
pub use input::{is_exit_command, InputSource, ScriptedInput, StdinInput};
pub use rag_agent::RagAgent;
pub use react_agent::ReactAgent;
pub use simple_bot::{ChatMode, SimpleBot};

use crate::llm::models::{LlmMessage, MessageRole};

/// Chat model the agents were tuned for
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Render a message for the console, with a banner naming its role
pub fn render_message(message: &LlmMessage) -> String {
    let title = match message.role {
        MessageRole::System => " System Message ",
        MessageRole::User => " Human Message ",
        MessageRole::Assistant => " Ai Message ",
        MessageRole::Tool => " Tool Message ",
    };
    let mut out = format!("{:=^80}\n", title);
    if let Some(name) = &message.name {
        out.push_str(&format!("Name: {}\n", name));
    }
    out.push('\n');
    out.push_str(message.text());

    if message.has_tool_calls() {
        if !message.text().is_empty() {
            out.push('\n');
        }
        out.push_str("Tool Calls:");
        for call in message.requested_tool_calls() {
            out.push_str(&format!("\n  {} ({})", call.name, call.id));
            let mut args: Vec<_> = call.arguments.iter().collect();
            args.sort_by(|a, b| a.0.cmp(b.0));
            out.push_str("\n  Args:");
            for (key, value) in args {
                out.push_str(&format!("\n    {}: {}", key, value));
            }
        }
    }
    out
}
