use crate::error::{Result, ToolchatError};
use crate::llm::tools::{parse_args, LlmTool, ToolDescriptor, ToolOutput};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Arguments shared by the integer arithmetic tools
#[derive(Debug, Deserialize, JsonSchema)]
pub struct OperandArgs {
    /// The first number.
    pub a: i64,
    /// The second number.
    pub b: i64,
}

/// Integer operation exposed to the model as a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] =
        [Operation::Add, Operation::Subtract, Operation::Multiply, Operation::Divide];

    fn tool_name(self) -> &'static str {
        match self {
            Operation::Add => "add_numbers",
            Operation::Subtract => "subtract_numbers",
            Operation::Multiply => "multiply_numbers",
            Operation::Divide => "divide_numbers",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Operation::Add => "Adds two numbers together.",
            Operation::Subtract => "Subtracts two numbers.",
            Operation::Multiply => "Multiplies two numbers together.",
            Operation::Divide => "Divides two numbers.",
        }
    }

    /// Apply the operation. Division rounds half to even.
    ///
    /// Division goes through `f64`, so quotients above 2^53 lose precision and
    /// `i64::MIN / -1` saturates to `i64::MAX`.
    pub fn apply(self, a: i64, b: i64) -> Result<i64> {
        let overflow = || ToolchatError::ToolError("integer overflow".to_string());
        match self {
            Operation::Add => a.checked_add(b).ok_or_else(overflow),
            Operation::Subtract => a.checked_sub(b).ok_or_else(overflow),
            Operation::Multiply => a.checked_mul(b).ok_or_else(overflow),
            Operation::Divide => {
                if b == 0 {
                    return Err(ToolchatError::ToolError("division by zero".to_string()));
                }
                Ok((a as f64 / b as f64).round_ties_even() as i64)
            }
        }
    }
}

/// One arithmetic tool of the ReAct calculator
#[derive(Debug, Clone, Copy)]
pub struct CalculatorTool {
    operation: Operation,
}

impl CalculatorTool {
    pub fn new(operation: Operation) -> Self {
        Self { operation }
    }
}

impl LlmTool for CalculatorTool {
    fn run(&self, args: &HashMap<String, Value>) -> Result<ToolOutput> {
        let OperandArgs { a, b } = parse_args(args)?;
        let result = self.operation.apply(a, b)?;
        Ok(ToolOutput::new(json!(result)))
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function::<OperandArgs>(
            self.operation.tool_name(),
            self.operation.description(),
        )
    }
}

/// The four calculator tools, in the order they are offered to the model
pub fn all_tools() -> Vec<Box<dyn LlmTool>> {
    Operation::ALL
        .into_iter()
        .map(|op| Box::new(CalculatorTool::new(op)) as Box<dyn LlmTool>)
        .collect()
}
