use crate::error::ApiError;
use crate::models::{AgentOutcome, PlanQuery, PlanResponse};
use crate::state::AppState;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;
use warp::{Rejection, Reply};

pub async fn handle_get_activity(
    query: PlanQuery,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    let city = query.city.trim();
    if city.is_empty() {
        state.metrics().record("bad_request");
        return Err(warp::reject::custom(ApiError::BadRequest(
            "City name cannot be empty.".to_string(),
        )));
    }

    let Some(agent) = state.agent() else {
        state.metrics().record("unavailable");
        return Err(warp::reject::custom(ApiError::ServiceUnavailable(
            "The planner agent is not initialized. Check server logs for errors.".to_string(),
        )));
    };

    let request_id = Uuid::new_v4();
    info!("Processing plan request [{}] for city: {}", request_id, city);

    let started = Instant::now();
    let outcome = agent.plan(city).await;
    state.metrics().observe_duration(started.elapsed().as_secs_f64());
    state.metrics().record(outcome.label());

    match outcome {
        AgentOutcome::Success(plan) => {
            info!("Sending plan [{}] for city: {}", request_id, city);
            let response = PlanResponse::planned(city, state.greeting_for(city), plan);
            Ok(warp::reply::json(&response))
        }
        AgentOutcome::Empty(raw) => {
            let message = format!(
                "Agent executed for {} but did not produce a standard output. Raw response: {}",
                city, raw
            );
            warn!("Plan request [{}]: {}", request_id, message);
            Ok(warp::reply::json(&PlanResponse::failed(city, message)))
        }
        AgentOutcome::Failure(detail) => Err(warp::reject::custom(ApiError::InternalError(format!(
            "An unexpected error occurred while processing your request for {}: {}",
            city, detail
        )))),
    }
}
