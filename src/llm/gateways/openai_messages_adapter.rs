//! Adapter between the internal message model and the OpenAI chat-completions format.

use crate::error::Result;
use crate::llm::models::{LlmMessage, LlmToolCall, MessageRole};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::warn;

/// Adapt LLM messages to OpenAI format.
pub fn adapt_messages_to_openai(messages: &[LlmMessage]) -> Result<Vec<Value>> {
    let mut result = Vec::with_capacity(messages.len());

    for msg in messages {
        let openai_msg = match msg.role {
            MessageRole::System => json!({
                "role": "system",
                "content": msg.text()
            }),
            MessageRole::User => json!({
                "role": "user",
                "content": msg.text()
            }),
            MessageRole::Assistant => {
                let mut assistant_msg = json!({
                    "role": "assistant",
                    "content": msg.content
                });

                if msg.has_tool_calls() {
                    let mut formatted_calls = Vec::new();
                    for tc in msg.requested_tool_calls() {
                        formatted_calls.push(json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": serde_json::to_string(&tc.arguments)?
                            }
                        }));
                    }
                    assistant_msg["tool_calls"] = Value::Array(formatted_calls);
                }

                assistant_msg
            }
            MessageRole::Tool => json!({
                "role": "tool",
                "content": msg.text(),
                "tool_call_id": msg.tool_call_id.as_deref().unwrap_or_default()
            }),
        };

        result.push(openai_msg);
    }

    Ok(result)
}

/// Convert tool calls from OpenAI format to internal format.
///
/// Calls without a function name are dropped. Calls without an id get a generated one so
/// that their results can still be matched in the history.
pub fn convert_tool_calls(tool_calls: &[Value]) -> Vec<LlmToolCall> {
    tool_calls
        .iter()
        .filter_map(|tc| {
            let name = tc["function"]["name"].as_str()?.to_string();
            let id = tc["id"]
                .as_str()
                .filter(|id| !id.is_empty())
                .map(String::from)
                .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));
            let args_str = tc["function"]["arguments"].as_str().unwrap_or("{}");

            let arguments: HashMap<String, Value> = match serde_json::from_str(args_str) {
                Ok(arguments) => arguments,
                Err(e) => {
                    warn!(tool = %name, error = %e, "Malformed tool call arguments");
                    HashMap::new()
                }
            };

            Some(LlmToolCall {
                id,
                name,
                arguments,
            })
        })
        .collect()
}
