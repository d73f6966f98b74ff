//! Append-only conversation history.
//!
//! Every tool-result message must answer a tool call emitted by an earlier assistant
//! message, and each call is answered at most once; [`ConversationHistory::push`]
//! rejects orphaned and duplicate results.

use crate::error::{Result, ToolchatError};
use crate::llm::models::{LlmMessage, MessageRole};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<LlmMessage>,
    issued_call_ids: HashSet<String>,
    answered_call_ids: HashSet<String>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: LlmMessage) -> Result<()> {
        if message.role == MessageRole::Tool {
            let id = message.tool_call_id.as_deref().ok_or_else(|| {
                ToolchatError::HistoryError("tool result without a call id".to_string())
            })?;
            if !self.issued_call_ids.contains(id) {
                return Err(ToolchatError::HistoryError(format!(
                    "tool result {} does not answer an earlier tool call",
                    id
                )));
            }
            if self.answered_call_ids.contains(id) {
                return Err(ToolchatError::HistoryError(format!(
                    "tool call {} already has a result",
                    id
                )));
            }
            self.answered_call_ids.insert(id.to_string());
        }
        if message.role == MessageRole::Assistant {
            self.issued_call_ids
                .extend(message.requested_tool_calls().iter().map(|c| c.id.clone()));
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = LlmMessage>) -> Result<()> {
        for message in messages {
            self.push(message)?;
        }
        Ok(())
    }

    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&LlmMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The history with `system` placed in front, for a model call
    pub fn with_system(&self, system: LlmMessage) -> Vec<LlmMessage> {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.push(system);
        messages.extend(self.messages.iter().cloned());
        messages
    }
}
