use crate::state::AppState;
use warp::{Filter, Rejection, Reply};

mod activity;
mod health;

pub fn routes(state: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let root_route = warp::path::end()
        .and(warp::get())
        .map(health::handle_root);

    let activity_route = warp::path("get-activity")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query())
        .and(with_state(state.clone()))
        .and_then(activity::handle_get_activity);

    let metrics_route = warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state))
        .and_then(health::handle_metrics);

    root_route.or(activity_route).or(metrics_route)
}

fn with_state(
    state: AppState,
) -> impl Filter<Extract = (AppState,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || state.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{PlanningAgent, SystemPrompt};
    use crate::error::handle_rejection;
    use crate::metrics::Metrics;
    use crate::models::PlanResponse;
    use crate::testing::{toolbox, ReplayModel, ScriptedModel, StubTool};
    use crate::llm::{ChatModel, ModelError, ModelReply};
    use crate::tools::ToolOutput;
    use serde_json::Value;
    use std::sync::Arc;
    use warp::http::StatusCode;

    fn agent_with(model: Arc<dyn ChatModel>) -> PlanningAgent {
        let weather = Arc::new(StubTool::weather(|city| {
            ToolOutput::Text(format!(
                "The current weather in {} is clear sky with a temperature of 22\u{b0}C.",
                city
            ))
        }));
        let search = Arc::new(StubTool::search(|query| {
            ToolOutput::Text(format!(
                "Search results for '{}':\n- Source: https://example.com/madrid\n  Snippet: Tickets and hours.",
                query
            ))
        }));
        let prompt = SystemPrompt::new("Plan in {language}.", "English").unwrap();
        PlanningAgent::new(model, toolbox(weather, search), prompt)
    }

    fn state_with(agent: Option<PlanningAgent>) -> AppState {
        AppState::new(agent, "Plan for {city}:", Metrics::new().unwrap())
    }

    async fn get(state: AppState, path: &str) -> (StatusCode, Value) {
        let filter = routes(state).recover(handle_rejection);
        let resp = warp::test::request()
            .method("GET")
            .path(path)
            .reply(&filter)
            .await;
        let body = serde_json::from_slice(resp.body()).unwrap_or(Value::Null);
        (resp.status(), body)
    }

    #[tokio::test]
    async fn root_answers_liveness_check() {
        let (status, body) = get(state_with(None), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "Hello": "World" }));
    }

    #[tokio::test]
    async fn blank_city_is_rejected_whether_or_not_ready() {
        for state in [state_with(None), state_with(Some(agent_with(Arc::new(ScriptedModel))))] {
            for path in ["/get-activity?city=", "/get-activity?city=%20%20%20", "/get-activity"] {
                let (status, body) = get(state.clone(), path).await;
                assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
                assert_eq!(body["detail"], "City name cannot be empty.");
                assert!(body.get("error").is_none());
            }
        }
    }

    #[tokio::test]
    async fn unconfigured_agent_is_unavailable() {
        let state = state_with(None);
        for _ in 0..2 {
            let (status, body) = get(state.clone(), "/get-activity?city=Paris").await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert!(body["detail"].as_str().unwrap().contains("not initialized"));
        }
        assert_eq!(state.metrics().count("unavailable"), 2);
    }

    #[tokio::test]
    async fn successful_plan_comes_back_with_greeting() {
        let state = state_with(Some(agent_with(Arc::new(ScriptedModel))));
        let (status, body) = get(state.clone(), "/get-activity?city=%20Madrid%20").await;

        assert_eq!(status, StatusCode::OK);
        let response: PlanResponse = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(response.city(), "Madrid");
        assert_eq!(response.greeting(), Some("Plan for Madrid:"));
        assert_eq!(response.error(), None);
        let plan = response.plan().unwrap();
        assert!(plan.contains("clear sky"));
        assert!(plan.contains("https://example.com/madrid"));
        assert!(body.get("error").unwrap().is_null());
        assert_eq!(state.metrics().count("success"), 1);
    }

    #[tokio::test]
    async fn empty_outcome_is_ok_with_error_field() {
        let model = Arc::new(ReplayModel::new(vec![Ok(ModelReply::text(""))]));
        let state = state_with(Some(agent_with(model)));
        let (status, body) = get(state, "/get-activity?city=Madrid").await;

        assert_eq!(status, StatusCode::OK);
        let response: PlanResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.plan(), None);
        assert_eq!(response.greeting(), None);
        let error = response.error().unwrap();
        assert!(error.contains("Madrid"));
        assert!(error.contains("Raw response"));
    }

    #[tokio::test]
    async fn agent_failure_is_a_server_error_naming_the_city() {
        let model = Arc::new(ReplayModel::new(vec![Err(ModelError::Decode(
            "truncated body".to_string(),
        ))]));
        let state = state_with(Some(agent_with(model)));
        let (status, body) = get(state, "/get-activity?city=Madrid").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("for Madrid"));
        assert!(detail.contains("truncated body"));
    }

    #[tokio::test]
    async fn metrics_are_exposed() {
        let state = state_with(None);
        let _ = get(state.clone(), "/get-activity?city=").await;
        let filter = routes(state).recover(handle_rejection);
        let resp = warp::test::request().path("/metrics").reply(&filter).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let text = String::from_utf8(resp.body().to_vec()).unwrap();
        assert!(text.contains(r#"activity_plan_requests_total{outcome="bad_request"} 1"#));
    }
}
