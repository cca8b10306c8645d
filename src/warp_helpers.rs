use serde::Serialize;
use std::convert::Infallible;

use warp::http::StatusCode;
use warp::{reject, Filter, Rejection, Reply};

use crate::inspire_service::InspireService;
use crate::rate_limit::RateLimited;
use crate::validation::ValidationError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub timestamp: String,
}

/// An upstream call failed and the route has no per-field fallback.
/// The message is what the client sees; the cause is only logged.
#[derive(Debug)]
pub struct UpstreamFailure {
    pub message: String,
}

impl reject::Reject for UpstreamFailure {}

impl reject::Reject for ValidationError {}

pub fn with_service(
    service: InspireService,
) -> impl Filter<Extract = (InspireService,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

pub fn error_reply(code: StatusCode, message: impl Into<String>) -> warp::reply::WithStatus<warp::reply::Json> {
    let error_response = ErrorResponse {
        error: message.into(),
        code: code.as_u16(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    warp::reply::with_status(warp::reply::json(&error_response), code)
}

pub async fn handle_rejection(err: Rejection) -> Result<Box<dyn Reply>, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(rate_limited) = err.find::<RateLimited>() {
        let quota = rate_limited.quota;
        let reply = error_reply(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests, please try again later.",
        );
        let reply = warp::reply::with_header(reply, "retry-after", quota.reset_secs.to_string());
        return Ok(Box::new(quota.decorate(reply)));
    } else if let Some(validation_error) = err.find::<ValidationError>() {
        code = StatusCode::BAD_REQUEST;
        message = validation_error.message.clone();
    } else if let Some(upstream_failure) = err.find::<UpstreamFailure>() {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = upstream_failure.message.clone();
    } else if let Some(invalid_query) = err.find::<warp::reject::InvalidQuery>() {
        code = StatusCode::BAD_REQUEST;
        message = invalid_query.to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method not allowed".to_string();
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal server error".to_string();
    }

    Ok(Box::new(error_reply(code, message)))
}

pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE"])
}
