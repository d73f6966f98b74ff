//! Chat bot with conversational memory.
//!
//! Every user turn and model reply is kept in the history and sent back on the next
//! turn. When the session ends the conversation is written to a plain-text log.

use crate::agents::conversation_loop::{ConversationLoop, StepOutcome, Termination};
use crate::agents::input::{is_exit_command, InputSource};
use crate::error::Result;
use crate::llm::history::ConversationHistory;
use crate::llm::models::{LlmMessage, MessageRole};
use crate::llm::LlmBroker;
use std::path::Path;
use tracing::info;

pub const DEFAULT_LOG_PATH: &str = "conversation_log.txt";

pub struct ChatBot {
    conversation: ConversationLoop,
    history: ConversationHistory,
}

impl ChatBot {
    pub fn new(broker: LlmBroker) -> Self {
        Self {
            conversation: ConversationLoop::builder(broker).termination(Termination::Never).build(),
            history: ConversationHistory::new(),
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Add a user turn and return the model's reply
    pub async fn send(&mut self, text: &str) -> Result<String> {
        self.history.push(LlmMessage::user(text))?;
        match self.conversation.step(&mut self.history).await? {
            StepOutcome::Reply(reply) => Ok(reply),
            // no tools are registered, so any requested call was answered with a notice
            StepOutcome::ToolsDispatched(_) => Ok(String::new()),
        }
    }

    /// Chat until the user exits, then write the conversation log to `log_path`
    pub async fn run(&mut self, input: &mut dyn InputSource, log_path: impl AsRef<Path>) -> Result<()> {
        let mut prompt = "\n\nWelcome to the Chatbot! Type your message (or 'exit' to quit): ";
        while let Some(line) = input.next_line(prompt)? {
            if is_exit_command(&line) {
                break;
            }
            let reply = self.send(&line).await?;
            println!("\nAI: {}\n", reply);
            prompt = "\nYou: ";
        }

        println!("\nThank you for chatting! Saving conversation history...");
        self.write_log(log_path.as_ref())?;
        println!("Conversation history saved to {}", log_path.as_ref().display());
        Ok(())
    }

    pub fn write_log(&self, path: &Path) -> Result<()> {
        std::fs::write(path, format_log(self.history.messages()))?;
        info!("Conversation log written to {}", path.display());
        Ok(())
    }
}

/// Render a conversation as `You:` / `AI:` lines between a header and a sentinel line
pub fn format_log(messages: &[LlmMessage]) -> String {
    let mut log = String::from("Conversation History:\n");
    for message in messages {
        match message.role {
            MessageRole::User => log.push_str(&format!("You: {}\n", message.text())),
            MessageRole::Assistant => log.push_str(&format!("AI: {}\n", message.text())),
            MessageRole::System | MessageRole::Tool => {}
        }
    }
    log.push_str("\nEnd of conversation log.\n");
    log
}
