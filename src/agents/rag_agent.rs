//! Retrieval-augmented agent.
//!
//! The model answers questions about a document corpus by calling `retriever_tool`, which
//! returns the best-matching passages. Each user turn runs the loop to completion on the
//! shared history, so follow-up questions see earlier answers.

use crate::agents::conversation_loop::{ConversationLoop, Termination};
use crate::agents::input::{is_exit_command, InputSource};
use crate::agents::render_message;
use crate::error::Result;
use crate::llm::history::ConversationHistory;
use crate::llm::models::LlmMessage;
use crate::llm::tools::retriever_tool::{Retriever, RetrieverTool};
use crate::llm::tools::ToolRegistry;
use crate::llm::LlmBroker;
use std::sync::Arc;
use tracing::info;

pub const SYSTEM_PROMPT: &str = "You are an intelligent AI assistant who answers questions about Artificial Intelligence Engineering \
based on the PDF document loaded into your knowledge base. Use the retriever tool available to answer \
questions about the Artificial Intelligence Engineering data. You can make multiple calls if needed. \
If you need to look up some information before asking a follow up question, you are allowed to do that! \
Please always cite the specific parts of the documents you use in your answers.";

pub struct RagAgent {
    conversation: ConversationLoop,
    history: ConversationHistory,
}

impl RagAgent {
    pub fn new(broker: LlmBroker, retriever: Arc<dyn Retriever>) -> Result<Self> {
        let tools = ToolRegistry::with_tools(vec![Box::new(RetrieverTool::new(retriever))])?;
        Ok(Self {
            conversation: ConversationLoop::builder(broker)
                .system_prompt(SYSTEM_PROMPT)
                .tools(tools)
                .termination(Termination::PendingToolCalls)
                .build(),
            history: ConversationHistory::new(),
        })
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Ask a question and return the final answer
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        self.history.push(LlmMessage::user(question))?;
        self.conversation.run(&mut self.history).await
    }

    /// Answer questions until the user types `exit` or `quit`
    pub async fn run(&mut self, input: &mut dyn InputSource) -> Result<()> {
        println!("Welcome to the RAG Agent! Ask me anything about Artificial Intelligence Engineering.");
        println!("Type 'exit/quit' to end the conversation.");

        while let Some(line) = input.next_line("You: ")? {
            if is_exit_command(&line) {
                break;
            }
            let start = self.history.len();
            self.ask(&line).await?;
            for message in &self.history.messages()[start..] {
                println!("{}", render_message(message));
            }
        }

        info!("RAG session ended after {} messages", self.history.len());
        println!("Ending conversation. Goodbye!");
        Ok(())
    }
}
