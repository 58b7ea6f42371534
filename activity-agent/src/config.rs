use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub openweathermap_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub openweathermap_url: String,
    pub tavily_base_url: String,
    pub system_prompt_path: String,
    pub plan_language: String,
    pub greeting_template: String,
    pub max_agent_iterations: usize,
    pub max_search_results: usize,
    pub max_content_snippet_length: usize,
    pub http_timeout_secs: u64,
    pub model_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8000,
            log_level: "info".to_string(),
            openweathermap_api_key: None,
            tavily_api_key: None,
            openai_api_key: None,
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openweathermap_url: "http://api.openweathermap.org/data/2.5/weather".to_string(),
            tavily_base_url: "https://api.tavily.com".to_string(),
            system_prompt_path: "prompts/system_prompt.md".to_string(),
            plan_language: "Spanish".to_string(),
            greeting_template:
                "Hola, soy tu asesor de actividades. Aqui tienes un plan para {city}:".to_string(),
            max_agent_iterations: 15,
            max_search_results: 3,
            max_content_snippet_length: 200,
            http_timeout_secs: 10,
            model_timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let config = Config {
            port: parse_or(&get, "PORT", defaults.port)?,
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            openweathermap_api_key: get("OPENWEATHERMAP_API_KEY"),
            tavily_api_key: get("TAVILY_API_KEY"),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            openweathermap_url: get("OPENWEATHERMAP_URL").unwrap_or(defaults.openweathermap_url),
            tavily_base_url: get("TAVILY_BASE_URL").unwrap_or(defaults.tavily_base_url),
            system_prompt_path: get("SYSTEM_PROMPT_PATH").unwrap_or(defaults.system_prompt_path),
            plan_language: get("PLAN_LANGUAGE").unwrap_or(defaults.plan_language),
            greeting_template: get("GREETING_TEMPLATE").unwrap_or(defaults.greeting_template),
            max_agent_iterations: parse_or(
                &get,
                "MAX_AGENT_ITERATIONS",
                defaults.max_agent_iterations,
            )?,
            max_search_results: parse_or(&get, "MAX_SEARCH_RESULTS", defaults.max_search_results)?,
            max_content_snippet_length: parse_or(
                &get,
                "MAX_CONTENT_SNIPPET_LENGTH",
                defaults.max_content_snippet_length,
            )?,
            http_timeout_secs: parse_or(&get, "HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            model_timeout_secs: parse_or(&get, "MODEL_TIMEOUT_SECS", defaults.model_timeout_secs)?,
        };

        if config.max_agent_iterations == 0 {
            bail!("invalid value for MAX_AGENT_ITERATIONS: must be at least 1");
        }
        Ok(config)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
