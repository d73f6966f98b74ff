//! Validated tool registry and dispatcher.
//!
//! The registry is built once when an agent starts and is read-only afterwards. Dispatch
//! never fails: an unknown tool name or a failing tool becomes the text of the
//! tool-result message, so the model can correct itself on the next turn.

use crate::error::{Result, ToolchatError};
use crate::llm::models::{LlmMessage, LlmToolCall};
use crate::llm::tools::{LlmTool, ToolDescriptor};
use std::collections::HashMap;
use tracing::{info, warn};

/// Registry mapping unique tool names to tools, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn LlmTool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of tools, rejecting duplicate names
    pub fn with_tools(tools: Vec<Box<dyn LlmTool>>) -> Result<Self> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, tool: Box<dyn LlmTool>) -> Result<()> {
        let name = tool.name();
        if name.is_empty() {
            return Err(ToolchatError::ConfigError("Tool name must not be empty".to_string()));
        }
        if self.index.contains_key(&name) {
            return Err(ToolchatError::ConfigError(format!(
                "Tool {} is already registered",
                name
            )));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn LlmTool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run one tool call and wrap the outcome in a tool-result message
    pub fn dispatch(&self, call: &LlmToolCall) -> LlmMessage {
        let Some(tool) = self.get(&call.name) else {
            warn!("Tool not found: {}", call.name);
            return LlmMessage::tool_result(
                call,
                format!(
                    "Tool {} not found. Retry and select tool from list of Available tools",
                    call.name
                ),
            );
        };

        info!("Executing tool: {}", call.name);
        match tool.run(&call.arguments) {
            Ok(output) => {
                let message = LlmMessage::tool_result(call, output.render());
                if output.completes_session {
                    message.completing_session()
                } else {
                    message
                }
            }
            Err(e) => {
                warn!("Tool execution failed: {}", e);
                LlmMessage::tool_result(call, format!("Error: {}", e))
            }
        }
    }

    /// Run every call in the order given, one result per call
    pub fn dispatch_all(&self, calls: &[LlmToolCall]) -> Vec<LlmMessage> {
        calls.iter().map(|call| self.dispatch(call)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::models::MessageRole;
    use crate::llm::tools::ToolOutput;
    use schemars::JsonSchema;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct NoArgs {}

    struct EchoTool {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl LlmTool for EchoTool {
        fn run(&self, args: &HashMap<String, Value>) -> Result<ToolOutput> {
            self.log.lock().unwrap().push(self.name.to_string());
            Ok(ToolOutput::new(json!(format!(
                "{} got {}",
                self.name,
                args.get("x").cloned().unwrap_or(Value::Null)
            ))))
        }

        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::function::<NoArgs>(self.name, "echo")
        }
    }

    struct FailingTool;

    impl LlmTool for FailingTool {
        fn run(&self, _args: &HashMap<String, Value>) -> Result<ToolOutput> {
            Err(ToolchatError::ToolError("boom".to_string()))
        }

        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::function::<NoArgs>("failing", "always fails")
        }
    }

    struct FinishingTool;

    impl LlmTool for FinishingTool {
        fn run(&self, _args: &HashMap<String, Value>) -> Result<ToolOutput> {
            Ok(ToolOutput::completing(json!("finished")))
        }

        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::function::<NoArgs>("finish", "finishes")
        }
    }

    fn call(id: &str, name: &str, x: i64) -> LlmToolCall {
        LlmToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: HashMap::from([("x".to_string(), json!(x))]),
        }
    }

    fn echo(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Box<dyn LlmTool> {
        Box::new(EchoTool {
            name,
            log: Arc::clone(log),
        })
    }

    #[test]
    fn test_register_rejects_duplicate_names() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let result = ToolRegistry::with_tools(vec![echo("a", &log), echo("a", &log)]);

        assert!(matches!(result, Err(ToolchatError::ConfigError(_))));
    }

    #[test]
    fn test_names_keep_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry =
            ToolRegistry::with_tools(vec![echo("b", &log), echo("a", &log), echo("c", &log)])
                .unwrap();

        assert_eq!(registry.names(), vec!["b", "a", "c"]);
        assert_eq!(registry.descriptors().len(), 3);
        assert_eq!(registry.len(), 3);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_dispatch_unknown_tool_reports_not_found() {
        let registry = ToolRegistry::new();

        let message = registry.dispatch(&call("call_1", "missing", 1));

        assert_eq!(message.role, MessageRole::Tool);
        assert_eq!(message.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(
            message.text(),
            "Tool missing not found. Retry and select tool from list of Available tools"
        );
    }

    #[test]
    fn test_dispatch_failing_tool_reports_error() {
        let registry = ToolRegistry::with_tools(vec![Box::new(FailingTool)]).unwrap();

        let message = registry.dispatch(&call("call_2", "failing", 1));

        assert_eq!(message.tool_call_id.as_deref(), Some("call_2"));
        assert_eq!(message.text(), "Error: Tool error: boom");
        assert!(!message.completes_session);
    }

    #[test]
    fn test_dispatch_sets_completion_flag() {
        let registry = ToolRegistry::with_tools(vec![Box::new(FinishingTool)]).unwrap();

        let message = registry.dispatch(&call("call_3", "finish", 0));

        assert_eq!(message.text(), "finished");
        assert!(message.completes_session);
    }

    #[test]
    fn test_dispatch_all_preserves_call_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ToolRegistry::with_tools(vec![echo("a", &log), echo("b", &log)]).unwrap();

        let results = registry.dispatch_all(&[call("call_b", "b", 2), call("call_a", "a", 1)]);

        let ids: Vec<_> = results.iter().map(|m| m.tool_call_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["call_b", "call_a"]);
        assert_eq!(results[0].text(), "b got 2");
        assert_eq!(results[1].text(), "a got 1");
        assert_eq!(*log.lock().unwrap(), vec!["b", "a"]);
    }
}
