use crate::agents::conversation_loop::{ConversationLoop, Termination};
use crate::error::Result;
use crate::llm::history::ConversationHistory;
use crate::llm::models::LlmMessage;
use crate::llm::tools::{calculator, ToolRegistry};
use crate::llm::LlmBroker;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant please answer my questions with best of my abilities. ";

pub const DEMO_QUESTION: &str =
    "Can you calculate this 2 + 4 then multiply by 10 divide by 2 and subtract 3?";

/// Reason-and-act agent over the four calculator tools
///
/// Each question runs the loop until the model answers without requesting tools.
pub struct ReactAgent {
    conversation: ConversationLoop,
}

impl ReactAgent {
    pub fn new(broker: LlmBroker) -> Result<Self> {
        let tools = ToolRegistry::with_tools(calculator::all_tools())?;
        Ok(Self {
            conversation: ConversationLoop::builder(broker)
                .system_prompt(SYSTEM_PROMPT)
                .tools(tools)
                .termination(Termination::PendingToolCalls)
                .build(),
        })
    }

    pub fn conversation(&self) -> &ConversationLoop {
        &self.conversation
    }

    /// Answer `question`, returning the full transcript of the run
    pub async fn solve(&self, question: &str) -> Result<ConversationHistory> {
        let mut history = ConversationHistory::new();
        history.push(LlmMessage::user(question))?;
        self.conversation.run(&mut history).await?;
        Ok(history)
    }
}
