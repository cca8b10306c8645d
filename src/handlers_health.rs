use serde_json::json;
use std::convert::Infallible;
use warp::{Filter, Reply};

pub async fn health_check() -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&json!({ "status": "ok" })))
}

pub fn build_health_routes(
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health_check)
}
