use thiserror::Error;
use tracing::error;
use warp::http::StatusCode;
use warp::{reject::Reject, Rejection, Reply};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    InternalError(String),
}

impl Reject for ApiError {}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn detail(message: impl Into<String>, code: StatusCode) -> warp::reply::WithStatus<warp::reply::Json> {
    let json = warp::reply::json(&serde_json::json!({ "detail": message.into() }));
    warp::reply::with_status(json, code)
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(api_err) = err.find::<ApiError>() {
        if api_err.status().is_server_error() {
            error!("Request failed: {}", api_err);
        }
        return Ok(detail(api_err.to_string(), api_err.status()));
    }

    if err.is_not_found() {
        return Ok(detail("Not Found", StatusCode::NOT_FOUND));
    }

    if let Some(invalid) = err.find::<warp::reject::InvalidQuery>() {
        return Ok(detail(invalid.to_string(), StatusCode::BAD_REQUEST));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(detail("Method Not Allowed", StatusCode::METHOD_NOT_ALLOWED));
    }

    Err(err)
}
