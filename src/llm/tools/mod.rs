pub mod brainstorm;
pub mod calculator;
mod registry;
pub mod retriever_tool;
mod tool;

pub use registry::ToolRegistry;
pub use tool::{
    parameters_schema, parse_args, FunctionDescriptor, LlmTool, ToolDescriptor, ToolOutput,
};
