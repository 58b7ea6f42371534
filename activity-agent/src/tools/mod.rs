pub mod search;
pub mod weather;

use crate::llm::{ToolCall, ToolSpec};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub use search::ActivitySearch;
pub use weather::WeatherLookup;

/// Result of running a tool. Failures are ordinary values so the model can
/// read them and carry on with the rest of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Text(String),
    Failure(String),
}

impl ToolOutput {
    pub fn is_failure(&self) -> bool {
        matches!(self, ToolOutput::Failure(_))
    }

    /// Text handed to the model. Failures carry the `Error: ` sentinel.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutput::Text(text) => f.write_str(text),
            ToolOutput::Failure(reason) => write!(f, "Error: {}", reason),
        }
    }
}

/// The model asked for something that cannot be executed as written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolCallError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("arguments for '{tool}' are not valid JSON: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("'{tool}' requires a non-empty string argument '{argument}'")]
    MissingArgument { tool: String, argument: String },
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value;

    async fn call(&self, args: &Value) -> Result<ToolOutput, ToolCallError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Pulls a required, non-blank string argument out of a call's arguments.
pub fn string_arg<'a>(tool: &str, args: &'a Value, argument: &str) -> Result<&'a str, ToolCallError> {
    args.get(argument)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ToolCallError::MissingArgument {
            tool: tool.to_string(),
            argument: argument.to_string(),
        })
}

/// The set of capabilities exposed to the model for one agent.
#[derive(Clone, Default)]
pub struct Toolbox {
    tools: Vec<Arc<dyn Tool>>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Resolves and runs one model-issued call. Only formatting problems are
    /// errors; anything that goes wrong inside the tool is a `ToolOutput::Failure`.
    pub async fn dispatch(&self, call: &ToolCall) -> Result<ToolOutput, ToolCallError> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| ToolCallError::UnknownTool(call.name.clone()))?;

        let raw = if call.arguments.trim().is_empty() {
            "{}"
        } else {
            call.arguments.as_str()
        };
        let args: Value =
            serde_json::from_str(raw).map_err(|e| ToolCallError::InvalidArguments {
                tool: call.name.clone(),
                reason: e.to_string(),
            })?;

        tool.call(&args).await
    }
}
