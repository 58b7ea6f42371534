// Language-model backend: conversation types and the chat seam the planner drives

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub mod openai;

pub use openai::OpenAiChatModel;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model backend responded {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response from model backend: {0}")]
    Decode(String),
}

/// A function call requested by the model. `arguments` is the raw JSON text
/// the model produced and may be malformed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User {
            content: content.into(),
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        ChatMessage::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }
}

/// Function declaration advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// One assistant turn. No tool calls means the model considers itself done.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<String>,
}

impl ModelReply {
    pub fn text(content: impl Into<String>) -> Self {
        ModelReply {
            content: Some(content.into()),
            tool_calls: Vec::new(),
            finish_reason: Some("stop".to_string()),
        }
    }

    pub fn calls(tool_calls: Vec<ToolCall>) -> Self {
        ModelReply {
            content: None,
            tool_calls,
            finish_reason: Some("tool_calls".to_string()),
        }
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ModelReply, ModelError>;
}
