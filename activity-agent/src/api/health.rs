use crate::error::ApiError;
use crate::state::AppState;
use warp::{Rejection, Reply};

pub fn handle_root() -> impl Reply {
    warp::reply::json(&serde_json::json!({ "Hello": "World" }))
}

pub async fn handle_metrics(state: AppState) -> Result<impl Reply, Rejection> {
    let (body, content_type) = state
        .metrics()
        .render()
        .map_err(|e| warp::reject::custom(ApiError::InternalError(e.to_string())))?;
    Ok(warp::reply::with_header(body, "Content-Type", content_type))
}
