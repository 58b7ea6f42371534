// Planner Agent: drives the model through weather and activity lookups into one plan

use super::prompt::SystemPrompt;
use crate::config::Config;
use crate::llm::{ChatMessage, ChatModel, ModelError, ModelReply, OpenAiChatModel};
use crate::models::AgentOutcome;
use crate::tools::{ActivitySearch, ToolCallError, Toolbox, WeatherLookup};
use anyhow::{anyhow, Result};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

pub const DEFAULT_MAX_ITERATIONS: usize = 15;

pub const REPAIR_PROMPT: &str =
    "An error occurred while parsing the agent's output. Please check the format and try again.";

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("model backend failed: {0}")]
    Model(#[from] ModelError),

    #[error("tool call could not be repaired: {0}")]
    MalformedToolCall(ToolCallError),
}

pub struct PlanningAgent {
    model: Arc<dyn ChatModel>,
    tools: Toolbox,
    prompt: SystemPrompt,
    max_iterations: usize,
}

impl PlanningAgent {
    pub fn new(model: Arc<dyn ChatModel>, tools: Toolbox, prompt: SystemPrompt) -> Self {
        Self {
            model,
            tools,
            prompt,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Wires the OpenAI backend, both tools and the prompt file. Fails when the
    /// model cannot be configured; missing tool keys only degrade the tools.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| anyhow!("OPENAI_API_KEY is not configured."))?;

        let tool_timeout = Duration::from_secs(config.http_timeout_secs);
        let weather = WeatherLookup::new(
            &config.openweathermap_url,
            config.openweathermap_api_key.clone(),
            tool_timeout,
        )?;
        let search = ActivitySearch::new(
            &config.tavily_base_url,
            config.tavily_api_key.clone(),
            config.max_search_results,
            config.max_content_snippet_length,
            tool_timeout,
        )?;
        let model = OpenAiChatModel::new(
            &config.openai_base_url,
            api_key,
            config.openai_model.clone(),
            Duration::from_secs(config.model_timeout_secs),
        )?;
        let prompt = SystemPrompt::load(&config.system_prompt_path, &config.plan_language)?;

        let tools = Toolbox::new()
            .with_tool(Arc::new(weather))
            .with_tool(Arc::new(search));

        Ok(Self::new(Arc::new(model), tools, prompt).with_max_iterations(config.max_agent_iterations))
    }

    pub fn request_for(city: &str) -> String {
        format!("Provide activity suggestions for {}.", city)
    }

    #[instrument(skip(self), fields(model = %self.model.name()))]
    pub async fn plan(&self, city: &str) -> AgentOutcome {
        match self.run(city).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Planner: run for {} failed: {}", city, e);
                AgentOutcome::Failure(e.to_string())
            }
        }
    }

    async fn run(&self, city: &str) -> Result<AgentOutcome, AgentError> {
        let input = Self::request_for(city);
        let specs = self.tools.specs();
        let mut messages = vec![
            ChatMessage::system(self.prompt.as_str()),
            ChatMessage::user(input.clone()),
        ];
        let mut repaired = false;
        let mut tool_calls = 0usize;
        let mut last_reply: Option<ModelReply> = None;

        for iteration in 1..=self.max_iterations {
            debug!("Planner: iteration {} for {}", iteration, city);
            let reply = self.model.complete(&messages, &specs).await?;

            if reply.tool_calls.is_empty() {
                let answer = reply
                    .content
                    .as_deref()
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string);
                return Ok(match answer {
                    Some(plan) => {
                        info!(
                            "Planner: finished {} after {} iterations and {} tool calls",
                            city, iteration, tool_calls
                        );
                        AgentOutcome::Success(plan)
                    }
                    None => {
                        warn!("Planner: model stopped without an answer for {}", city);
                        AgentOutcome::Empty(raw_state(
                            &input,
                            iteration,
                            tool_calls,
                            "no final answer",
                            Some(&reply),
                        ))
                    }
                });
            }

            messages.push(ChatMessage::Assistant {
                content: reply.content.clone(),
                tool_calls: reply.tool_calls.clone(),
            });

            // The repair allowance covers a whole turn: every bad call in it gets the prompt.
            let mut malformed = false;
            for call in &reply.tool_calls {
                tool_calls += 1;
                let content = match self.tools.dispatch(call).await {
                    Ok(output) => {
                        if output.is_failure() {
                            warn!("Planner: {} reported a failure: {}", call.name, output);
                        } else {
                            info!("Planner: {} succeeded", call.name);
                        }
                        output.render()
                    }
                    Err(e) if repaired => return Err(AgentError::MalformedToolCall(e)),
                    Err(e) => {
                        warn!("Planner: malformed call to {}, asking for a repair: {}", call.name, e);
                        malformed = true;
                        self.repair_message(&e)
                    }
                };
                messages.push(ChatMessage::tool(call.id.clone(), content));
            }
            if malformed {
                repaired = true;
            }

            last_reply = Some(reply);
        }

        warn!(
            "Planner: iteration limit {} reached for {}",
            self.max_iterations, city
        );
        Ok(AgentOutcome::Empty(raw_state(
            &input,
            self.max_iterations,
            tool_calls,
            "iteration limit reached",
            last_reply.as_ref(),
        )))
    }

    fn repair_message(&self, problem: &ToolCallError) -> String {
        let expected: Vec<String> = self
            .tools
            .specs()
            .iter()
            .map(|spec| format!("{} with arguments {}", spec.name, spec.parameters))
            .collect();
        format!(
            "{} Problem: {}. Call one of: {}.",
            REPAIR_PROMPT,
            problem,
            expected.join("; ")
        )
    }
}

fn raw_state(
    input: &str,
    iterations: usize,
    tool_calls: usize,
    stop_reason: &str,
    last_reply: Option<&ModelReply>,
) -> String {
    json!({
        "input": input,
        "iterations": iterations,
        "tool_calls": tool_calls,
        "stop_reason": stop_reason,
        "last_reply": last_reply,
    })
    .to_string()
}
