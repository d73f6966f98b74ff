//! Scripted gateway shared by the agent tests.

use crate::error::{Result, ToolchatError};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::{LlmGatewayResponse, LlmMessage, LlmToolCall};
use crate::llm::tools::ToolDescriptor;
use crate::llm::LlmBroker;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Replays canned responses and records every request it receives
#[derive(Default)]
pub struct ScriptedGateway {
    responses: Mutex<VecDeque<LlmGatewayResponse>>,
    requests: Mutex<Vec<Vec<LlmMessage>>>,
    offered_tools: Mutex<Vec<Vec<String>>>,
    embeddings: HashMap<String, Vec<f32>>,
    embedded_texts: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new(responses: Vec<LlmGatewayResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        })
    }

    /// Scripted responses plus a fixed embedding vector per known text
    pub fn with_embeddings(
        responses: Vec<LlmGatewayResponse>,
        embeddings: &[(&str, Vec<f32>)],
    ) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            embeddings: embeddings
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.clone()))
                .collect(),
            ..Default::default()
        })
    }

    pub fn broker(self: &Arc<Self>) -> LlmBroker {
        LlmBroker::new("scripted-model", Arc::clone(self) as Arc<dyn LlmGateway>)
    }

    pub fn requests(&self) -> Vec<Vec<LlmMessage>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn offered_tools(&self) -> Vec<Vec<String>> {
        self.offered_tools.lock().unwrap().clone()
    }

    pub fn embedded_texts(&self) -> Vec<String> {
        self.embedded_texts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmGateway for ScriptedGateway {
    async fn complete(
        &self,
        _model: &str,
        messages: &[LlmMessage],
        tools: Option<&[ToolDescriptor]>,
        _config: &CompletionConfig,
    ) -> Result<LlmGatewayResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.offered_tools.lock().unwrap().push(
            tools
                .unwrap_or_default()
                .iter()
                .map(|t| t.function.name.clone())
                .collect(),
        );
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ToolchatError::GatewayError("script exhausted".to_string()))
    }

    async fn calculate_embeddings(&self, text: &str, _model: Option<&str>) -> Result<Vec<f32>> {
        self.embedded_texts.lock().unwrap().push(text.to_string());
        self.embeddings
            .get(text)
            .cloned()
            .ok_or_else(|| ToolchatError::GatewayError(format!("no embedding for {}", text)))
    }
}

pub fn reply(text: &str) -> LlmGatewayResponse {
    LlmGatewayResponse {
        content: Some(text.to_string()),
        tool_calls: vec![],
    }
}

pub fn tool_call(id: &str, name: &str, arguments: &[(&str, Value)]) -> LlmToolCall {
    LlmToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<HashMap<_, _>>(),
    }
}

pub fn calls(tool_calls: Vec<LlmToolCall>) -> LlmGatewayResponse {
    LlmGatewayResponse {
        content: None,
        tool_calls,
    }
}
