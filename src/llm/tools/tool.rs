use crate::error::{Result, ToolchatError};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Descriptor for tool function parameters
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDescriptor {
    pub r#type: String,
    pub function: FunctionDescriptor,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDescriptor {
    /// Describe a function tool whose parameters follow the JSON schema of `A`
    pub fn function<A: JsonSchema>(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            r#type: "function".to_string(),
            function: FunctionDescriptor {
                name: name.into(),
                description: description.into(),
                parameters: parameters_schema::<A>(),
            },
        }
    }
}

/// JSON schema for a tool argument struct, without the root metadata keys
pub fn parameters_schema<A: JsonSchema>() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(A))
        .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
    if let Some(root) = schema.as_object_mut() {
        root.remove("$schema");
        root.remove("title");
    }
    schema
}

/// Deserialize the argument mapping of a tool call into a typed struct
pub fn parse_args<A: DeserializeOwned>(args: &HashMap<String, Value>) -> Result<A> {
    let object: serde_json::Map<String, Value> =
        args.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    serde_json::from_value(Value::Object(object))
        .map_err(|e| ToolchatError::ToolError(format!("Invalid arguments: {}", e)))
}

/// Value returned by a tool
///
/// `completes_session` is the structured signal a tool raises when its result should
/// end the conversation (e.g. the brainstorm document has been saved).
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub value: Value,
    pub completes_session: bool,
}

impl ToolOutput {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            completes_session: false,
        }
    }

    pub fn completing(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            completes_session: true,
        }
    }

    /// Text placed into the tool-result message; strings are used verbatim
    pub fn render(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl From<Value> for ToolOutput {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Trait for LLM tools
pub trait LlmTool: Send + Sync {
    /// Execute the tool with given arguments
    fn run(&self, args: &HashMap<String, Value>) -> Result<ToolOutput>;

    /// Get tool descriptor for LLM
    fn descriptor(&self) -> ToolDescriptor;

    fn name(&self) -> String {
        self.descriptor().function.name
    }
}
