// Deterministic stand-ins for the model backend and the external tools

use crate::llm::{ChatMessage, ChatModel, ModelError, ModelReply, ToolCall, ToolSpec};
use crate::tools::{string_arg, Tool, ToolCallError, ToolOutput, Toolbox};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const WEATHER_TOOL: &str = "get_weather";
pub const SEARCH_TOOL: &str = "search_activity_links";

/// Tool whose answer is computed from its single string argument.
pub struct StubTool {
    name: &'static str,
    argument: &'static str,
    answer: Box<dyn Fn(&str) -> ToolOutput + Send + Sync>,
    calls: Mutex<Vec<String>>,
}

impl StubTool {
    pub fn new<F>(name: &'static str, argument: &'static str, answer: F) -> Self
    where
        F: Fn(&str) -> ToolOutput + Send + Sync + 'static,
    {
        Self {
            name,
            argument,
            answer: Box::new(answer),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn weather<F>(answer: F) -> Self
    where
        F: Fn(&str) -> ToolOutput + Send + Sync + 'static,
    {
        Self::new(WEATHER_TOOL, "city", answer)
    }

    pub fn search<F>(answer: F) -> Self
    where
        F: Fn(&str) -> ToolOutput + Send + Sync + 'static,
    {
        Self::new(SEARCH_TOOL, "activity_query", answer)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "stub"
    }

    fn parameters(&self) -> Value {
        let mut properties = serde_json::Map::new();
        properties.insert(self.argument.to_string(), json!({ "type": "string" }));
        json!({
            "type": "object",
            "properties": properties,
            "required": [self.argument]
        })
    }

    async fn call(&self, args: &Value) -> Result<ToolOutput, ToolCallError> {
        let value = string_arg(self.name, args, self.argument)?;
        self.calls.lock().unwrap().push(value.to_string());
        Ok((self.answer)(value))
    }
}

pub fn toolbox(weather: Arc<StubTool>, search: Arc<StubTool>) -> Toolbox {
    Toolbox::new().with_tool(weather).with_tool(search)
}

pub fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}

/// Plays back a fixed list of replies and records every conversation it saw.
#[derive(Default)]
pub struct ReplayModel {
    replies: Mutex<VecDeque<Result<ModelReply, ModelError>>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ReplayModel {
    pub fn new(replies: Vec<Result<ModelReply, ModelError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn last_conversation(&self) -> Vec<ChatMessage> {
        self.seen.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for ReplayModel {
    fn name(&self) -> &str {
        "replay"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolSpec],
    ) -> Result<ModelReply, ModelError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Decode("replay script exhausted".to_string())))
    }
}

/// Walks the planning procedure mechanically: weather first, then one search
/// per weather-appropriate activity, then a plan built only from tool output.
pub struct ScriptedModel;

const REQUEST_PREFIX: &str = "Provide activity suggestions for ";

impl ScriptedModel {
    fn city(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .find_map(|message| match message {
                ChatMessage::User { content } => Some(content.as_str()),
                _ => None,
            })
            .and_then(|content| content.strip_prefix(REQUEST_PREFIX))
            .map(|rest| rest.trim_end_matches('.').to_string())
            .unwrap_or_default()
    }

    /// (tool name, raw arguments, result text) for every answered call.
    fn results(messages: &[ChatMessage]) -> Vec<(String, Value, String)> {
        let calls: Vec<&ToolCall> = messages
            .iter()
            .filter_map(|message| match message {
                ChatMessage::Assistant { tool_calls, .. } => Some(tool_calls.iter()),
                _ => None,
            })
            .flatten()
            .collect();

        messages
            .iter()
            .filter_map(|message| match message {
                ChatMessage::Tool {
                    tool_call_id,
                    content,
                } => calls.iter().find(|call| &call.id == tool_call_id).map(|call| {
                    let args = serde_json::from_str(&call.arguments).unwrap_or(Value::Null);
                    (call.name.clone(), args, content.clone())
                }),
                _ => None,
            })
            .collect()
    }

    fn activities(weather: &str) -> [&'static str; 3] {
        let weather = weather.to_lowercase();
        let indoors = ["rain", "snow", "storm", "drizzle", "error"]
            .iter()
            .any(|word| weather.contains(word));
        if indoors {
            ["museum", "cinema", "aquarium"]
        } else {
            ["park", "walking tour", "rooftop terrace"]
        }
    }

    fn first_source(result: &str) -> Option<&str> {
        result
            .lines()
            .find_map(|line| line.trim().strip_prefix("- Source: "))
            .filter(|url| url.starts_with("http"))
    }

    fn compose(city: &str, weather: &str, searches: &[(String, String)]) -> String {
        let mut plan = if weather.starts_with("Error") {
            format!(
                "Weather information is not available for {} right now ({}).",
                city, weather
            )
        } else {
            weather.to_string()
        };

        for (query, result) in searches {
            let activity = query
                .strip_suffix(&format!(" {} official website", city))
                .unwrap_or(query);
            let line = match Self::first_source(result) {
                Some(url) => format!("\n- {}: {}", activity, url),
                None => format!(
                    "\n- {}: no link could be found ({})",
                    activity,
                    result.lines().next().unwrap_or_default()
                ),
            };
            plan.push_str(&line);
        }
        plan
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolSpec],
    ) -> Result<ModelReply, ModelError> {
        let city = Self::city(messages);
        if city.is_empty() {
            return Ok(ModelReply::text(
                "Which city would you like activity suggestions for?",
            ));
        }

        let results = Self::results(messages);
        let Some((_, _, weather)) = results.iter().find(|(name, _, _)| name == WEATHER_TOOL) else {
            return Ok(ModelReply::calls(vec![call(
                "call_weather",
                WEATHER_TOOL,
                json!({ "city": city }),
            )]));
        };

        let searches: Vec<(String, String)> = results
            .iter()
            .filter(|(name, _, _)| name == SEARCH_TOOL)
            .map(|(_, args, content)| {
                let query = args["activity_query"].as_str().unwrap_or_default().to_string();
                (query, content.clone())
            })
            .collect();

        if searches.is_empty() {
            let calls: Vec<ToolCall> = Self::activities(weather)
                .iter()
                .enumerate()
                .map(|(i, activity)| {
                    call(
                        &format!("call_search_{}", i),
                        SEARCH_TOOL,
                        json!({ "activity_query": format!("{} {} official website", activity, city) }),
                    )
                })
                .collect();
            return Ok(ModelReply::calls(calls));
        }

        Ok(ModelReply::text(Self::compose(&city, weather, &searches)))
    }
}
