// Activity link search backed by the Tavily search API

use super::{string_arg, Tool, ToolCallError, ToolOutput};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

const ELLIPSIS: &str = "...";

pub struct ActivitySearch {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    max_results: usize,
    max_snippet_chars: usize,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    url: Option<String>,
    content: Option<String>,
}

/// Cuts `content` to at most `bound` characters, marking the cut with `...`.
pub fn truncate_snippet(content: &str, bound: usize) -> String {
    if content.chars().count() <= bound {
        return content.to_string();
    }
    if bound <= ELLIPSIS.len() {
        return ELLIPSIS[..bound].to_string();
    }
    let keep = bound - ELLIPSIS.len();
    let mut snippet: String = content.chars().take(keep).collect();
    snippet.push_str(ELLIPSIS);
    snippet
}

impl ActivitySearch {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        max_results: usize,
        max_snippet_chars: usize,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            max_results,
            max_snippet_chars,
        })
    }

    pub async fn search(&self, query: &str) -> ToolOutput {
        let Some(api_key) = self.api_key.as_deref() else {
            return ToolOutput::Failure("TAVILY_API_KEY is not configured.".to_string());
        };

        info!("Search: {}", query);
        let request = SearchRequest {
            api_key,
            query,
            max_results: self.max_results,
        };
        let resp = match self
            .http
            .post(format!("{}/search", self.base_url))
            .json(&request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Search request for '{}' failed: {}", query, e);
                return ToolOutput::Failure(format!(
                    "An unexpected error occurred during Tavily search for '{}': {}",
                    query, e
                ));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("Search service responded {} for '{}'", status, query);
            return ToolOutput::Failure(format!(
                "Tavily search for '{}' failed with status {}: {}",
                query,
                status.as_u16(),
                body
            ));
        }

        match resp.json::<SearchResponse>().await {
            Ok(found) => self.format_hits(query, &found.results),
            Err(e) => ToolOutput::Failure(format!(
                "unexpected Tavily payload for '{}': {}",
                query, e
            )),
        }
    }

    fn format_hits(&self, query: &str, hits: &[SearchHit]) -> ToolOutput {
        if hits.is_empty() {
            return ToolOutput::Text(format!("No search results found for '{}'.", query));
        }

        let lines: Vec<String> = hits
            .iter()
            .take(self.max_results)
            .map(|hit| {
                let url = hit.url.as_deref().unwrap_or("N/A URL");
                let snippet = match hit.content.as_deref() {
                    Some(content) => truncate_snippet(content, self.max_snippet_chars),
                    None => "N/A Content".to_string(),
                };
                format!("- Source: {}\n  Snippet: {}", url, snippet)
            })
            .collect();

        ToolOutput::Text(format!(
            "Search results for '{}':\n{}",
            query,
            lines.join("\n")
        ))
    }
}

#[async_trait]
impl Tool for ActivitySearch {
    fn name(&self) -> &str {
        "search_activity_links"
    }

    fn description(&self) -> &str {
        "Search the web for a specific activity and return official links with short snippets."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "activity_query": {
                    "type": "string",
                    "description": "Search query, e.g. 'Prado Museum Madrid official website'"
                }
            },
            "required": ["activity_query"]
        })
    }

    async fn call(&self, args: &Value) -> Result<ToolOutput, ToolCallError> {
        let query = string_arg(self.name(), args, "activity_query")?;
        Ok(self.search(query).await)
    }
}
