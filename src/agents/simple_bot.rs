use crate::agents::input::{is_exit_command, InputSource};
use crate::error::{Result, ToolchatError};
use crate::llm::gateway::CompletionConfig;
use crate::llm::models::LlmMessage;
use crate::llm::LlmBroker;
use tracing::info;

/// How the simple bot talks to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    /// Answer one message and stop
    Single,
    /// Answer messages until the user exits
    Continuous,
}

impl ChatMode {
    /// Parse the menu choice `1` or `2`
    pub fn from_choice(choice: &str) -> Result<Self> {
        match choice.trim() {
            "1" => Ok(ChatMode::Single),
            "2" => Ok(ChatMode::Continuous),
            _ => Err(ToolchatError::ConfigError(
                "Invalid choice. Please enter 1 or 2.".to_string(),
            )),
        }
    }
}

/// Stateless bot: every request contains only the current user message
pub struct SimpleBot {
    broker: LlmBroker,
    config: CompletionConfig,
}

impl SimpleBot {
    pub fn new(broker: LlmBroker) -> Self {
        Self {
            broker,
            config: CompletionConfig::default(),
        }
    }

    pub async fn respond(&self, text: &str) -> Result<String> {
        self.broker.generate(&[LlmMessage::user(text)], Some(self.config.clone())).await
    }

    /// Answer user turns according to `mode`, returning the replies
    pub async fn run(&self, mode: ChatMode, input: &mut dyn InputSource) -> Result<Vec<String>> {
        let mut replies = Vec::new();
        while let Some(line) = input.next_line("You: ")? {
            if mode == ChatMode::Continuous && is_exit_command(&line) {
                break;
            }
            let reply = self.respond(&line).await?;
            println!("\nAI: {}\n", reply);
            replies.push(reply);
            if mode == ChatMode::Single {
                break;
            }
        }
        info!("Simple bot answered {} message(s)", replies.len());
        Ok(replies)
    }
}
