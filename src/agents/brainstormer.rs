//! Brainstorming agent.
//!
//! Every turn reads user input, calls the model and runs the `update`/`save` tools it
//! requests. The system prompt is rebuilt for each model call so the model always sees
//! the current document. The session ends once a save succeeds, on an exit command, or
//! when input runs out.

use crate::agents::conversation_loop::{ConversationLoop, Route, Termination};
use crate::agents::input::{is_exit_command, InputSource};
use crate::error::Result;
use crate::llm::history::ConversationHistory;
use crate::llm::models::{LlmMessage, MessageRole};
use crate::llm::tools::brainstorm::{self, BrainstormDocument};
use crate::llm::tools::ToolRegistry;
use crate::llm::LlmBroker;
use std::path::PathBuf;
use tracing::{info, warn};

pub const FIRST_PROMPT: &str = "\n\nI am ready to brainstorm ideas. what do you have in mind?";
pub const FOLLOW_UP_PROMPT: &str = "\nWhat do you think of this? Want me to update/save it?";

/// Build the system prompt around the current document content
pub fn system_prompt(content: &str) -> String {
    format!(
        "You are a brainstorming agent. Your task is to generate ideas based on the provided prompt.\n\
You should respond with a list of related ideas or suggestions and help user to update or modify the the content.\n\
   - If you receive a prompt that is not related to brainstorming, respond with an appropriate message.\n\
   - Always respond with a clear and concise list of only 10 ideas.\n\
   - If the user wants to update or modify content, use the `update` tool to append new ideas.\n\
   - If the user wants to save the Brainstorming, use the `save` tool with a filename.\n\
   - Make sure to always show the content document state after modifications.\n\
the current Brainstorming content is: {}",
        content
    )
}

#[derive(Debug, Clone)]
pub struct BrainstormerOptions {
    pub termination: Termination,
    /// Directory saved documents are written to; the working directory when `None`
    pub save_directory: Option<PathBuf>,
    pub temperature: f32,
}

impl Default for BrainstormerOptions {
    fn default() -> Self {
        Self {
            termination: Termination::SessionCompleted,
            save_directory: None,
            temperature: 0.7,
        }
    }
}

pub struct Brainstormer {
    conversation: ConversationLoop,
    document: BrainstormDocument,
}

impl Brainstormer {
    pub fn new(broker: LlmBroker) -> Result<Self> {
        Self::with_options(broker, BrainstormerOptions::default())
    }

    pub fn with_options(broker: LlmBroker, options: BrainstormerOptions) -> Result<Self> {
        let document = BrainstormDocument::new();
        let tools = brainstorm::all_tools(&document, options.save_directory.as_deref());

        let prompt_document = document.clone();
        let conversation = ConversationLoop::builder(broker)
            .system_prompt_fn(move || {
                let content = prompt_document.content().unwrap_or_else(|e| {
                    warn!("Could not read brainstorm document: {}", e);
                    String::new()
                });
                system_prompt(&content)
            })
            .tools(ToolRegistry::with_tools(tools)?)
            .termination(options.termination)
            .temperature(options.temperature)
            .build();

        Ok(Self { conversation, document })
    }

    pub fn document(&self) -> &BrainstormDocument {
        &self.document
    }

    /// Run one brainstorming session, returning its transcript
    pub async fn run(&self, input: &mut dyn InputSource) -> Result<ConversationHistory> {
        let mut history = ConversationHistory::new();

        loop {
            let prompt = if history.is_empty() { FIRST_PROMPT } else { FOLLOW_UP_PROMPT };
            let Some(line) = input.next_line(prompt)? else {
                break;
            };
            if is_exit_command(&line) {
                break;
            }
            if !history.is_empty() {
                println!("\nUser input: {}", line);
            }
            history.push(LlmMessage::user(line))?;

            self.conversation.call_model(&mut history).await?;
            if let Some(response) = history.last() {
                println!("\nAI response: {}", response.text());
                if response.has_tool_calls() {
                    let names: Vec<&str> =
                        response.requested_tool_calls().iter().map(|c| c.name.as_str()).collect();
                    println!("\nTool calls: {:?}", names);
                }
            }

            let start = history.len();
            self.conversation.dispatch_tools(&mut history)?;
            for message in &history.messages()[start..] {
                if message.role == MessageRole::Tool {
                    println!("Tool Message: {}", message.text());
                }
            }

            if self.conversation.should_continue(&history) == Route::End {
                info!("Brainstorm document saved, ending session");
                break;
            }
        }

        println!("\nBrainstorming session ended. Thank you for using the Brainstormer agent!");
        Ok(history)
    }
}
