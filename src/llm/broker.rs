use crate::error::Result;
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::LlmMessage;
use crate::llm::tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info};

/// Main interface for LLM interactions
///
/// Binds a model name to a gateway. Tool calls are returned to the caller untouched;
/// running them is the job of the conversation loop.
pub struct LlmBroker {
    model: String,
    gateway: Arc<dyn LlmGateway>,
}

impl LlmBroker {
    /// Create a new LLM broker
    pub fn new(model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            model: model.into(),
            gateway,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model for the next assistant message, offering the registry's tools
    pub async fn complete(
        &self,
        messages: &[LlmMessage],
        tools: Option<&ToolRegistry>,
        config: Option<CompletionConfig>,
    ) -> Result<LlmMessage> {
        let config = config.unwrap_or_default();
        let descriptors = tools.filter(|t| !t.is_empty()).map(|t| t.descriptors());

        debug!("Model: {}, Message count: {}", self.model, messages.len());
        let response = self
            .gateway
            .complete(&self.model, messages, descriptors.as_deref(), &config)
            .await?;

        if !response.tool_calls.is_empty() {
            info!("Tool calls requested: {}", response.tool_calls.len());
        }
        Ok(LlmMessage::from_response(response))
    }

    /// Generate text response from LLM
    pub async fn generate(
        &self,
        messages: &[LlmMessage],
        config: Option<CompletionConfig>,
    ) -> Result<String> {
        let message = self.complete(messages, None, config).await?;
        Ok(message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolchatError;
    use crate::llm::models::{LlmGatewayResponse, LlmToolCall};
    use crate::llm::tools::{calculator, ToolDescriptor};
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mock gateway for testing
    struct MockGateway {
        responses: Vec<LlmGatewayResponse>,
        call_count: Mutex<usize>,
        offered_tools: Mutex<Vec<Option<usize>>>,
    }

    impl MockGateway {
        fn new(responses: Vec<LlmGatewayResponse>) -> Self {
            Self {
                responses,
                call_count: Mutex::new(0),
                offered_tools: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmGateway for MockGateway {
        async fn complete(
            &self,
            _model: &str,
            _messages: &[LlmMessage],
            tools: Option<&[ToolDescriptor]>,
            _config: &CompletionConfig,
        ) -> Result<LlmGatewayResponse> {
            self.offered_tools.lock().unwrap().push(tools.map(|t| t.len()));
            let mut count = self.call_count.lock().unwrap();
            let idx = *count;
            *count += 1;

            self.responses
                .get(idx)
                .cloned()
                .ok_or_else(|| ToolchatError::GatewayError("no more responses".to_string()))
        }

        async fn calculate_embeddings(
            &self,
            _text: &str,
            _model: Option<&str>,
        ) -> Result<Vec<f32>> {
            Ok(vec![0.1, 0.2, 0.3])
        }
    }

    #[tokio::test]
    async fn test_broker_new() {
        let gateway = Arc::new(MockGateway::new(vec![]));
        let broker = LlmBroker::new("test-model", gateway);
        assert_eq!(broker.model(), "test-model");
    }

    #[tokio::test]
    async fn test_generate_simple_response() {
        let gateway = Arc::new(MockGateway::new(vec![LlmGatewayResponse {
            content: Some("Hello, World!".to_string()),
            tool_calls: vec![],
        }]));
        let broker = LlmBroker::new("test-model", gateway);

        let result = broker.generate(&[LlmMessage::user("Hi")], None).await.unwrap();

        assert_eq!(result, "Hello, World!");
    }

    #[tokio::test]
    async fn test_generate_empty_response_content() {
        let gateway = Arc::new(MockGateway::new(vec![LlmGatewayResponse::default()]));
        let broker = LlmBroker::new("test-model", gateway);

        let result = broker.generate(&[LlmMessage::user("Hi")], None).await.unwrap();

        assert_eq!(result, "");
    }

    #[tokio::test]
    async fn test_complete_returns_tool_calls_without_running_them() {
        let gateway = Arc::new(MockGateway::new(vec![LlmGatewayResponse {
            content: None,
            tool_calls: vec![LlmToolCall {
                id: "call_1".to_string(),
                name: "add_numbers".to_string(),
                arguments: HashMap::new(),
            }],
        }]));
        let broker = LlmBroker::new("test-model", gateway.clone());
        let tools = ToolRegistry::with_tools(calculator::all_tools()).unwrap();

        let message =
            broker.complete(&[LlmMessage::user("add")], Some(&tools), None).await.unwrap();

        assert!(message.has_tool_calls());
        assert_eq!(*gateway.offered_tools.lock().unwrap(), vec![Some(4)]);
    }

    #[tokio::test]
    async fn test_empty_registry_offers_no_tools() {
        let gateway = Arc::new(MockGateway::new(vec![LlmGatewayResponse::default()]));
        let broker = LlmBroker::new("test-model", gateway.clone());

        broker
            .complete(&[LlmMessage::user("hi")], Some(&ToolRegistry::new()), None)
            .await
            .unwrap();

        assert_eq!(*gateway.offered_tools.lock().unwrap(), vec![None]);
    }

    #[tokio::test]
    async fn test_gateway_error_propagates() {
        let gateway = Arc::new(MockGateway::new(vec![]));
        let broker = LlmBroker::new("test-model", gateway);

        let result = broker.generate(&[LlmMessage::user("Hi")], None).await;

        assert!(matches!(result, Err(ToolchatError::GatewayError(_))));
    }
}
