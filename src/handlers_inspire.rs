use serde::Deserialize;
use warp::{reject, Filter, Rejection, Reply};

use crate::inspire_service::InspireService;
use crate::validation::{validate_filter, validate_search_query};
use crate::warp_helpers::{with_service, UpstreamFailure};

#[derive(Debug, Deserialize)]
pub struct AdviceSearchQuery {
    pub q: Option<String>,
}

pub async fn get_inspiration(
    query: Vec<(String, String)>,
    service: InspireService,
) -> Result<impl Reply, Rejection> {
    let filter = validate_filter(&query).map_err(|e| {
        log::debug!("Rejected inspiration query {:?}: {}", query, e);
        reject::custom(e)
    })?;

    let result = service.fetch_inspiration(&filter).await;
    if !result.is_complete() {
        log::info!(
            "Partial inspiration: activity={:?} advice={:?} quote={:?}",
            result.activity_error,
            result.advice_error,
            result.quote_error
        );
    }

    Ok(warp::reply::json(&result))
}

pub async fn search_advice(
    query: AdviceSearchQuery,
    service: InspireService,
) -> Result<impl Reply, Rejection> {
    let keyword = validate_search_query(query.q.as_deref()).map_err(reject::custom)?;
    log::info!("Advice search query: '{}'", keyword);

    match service.search_advice(keyword).await {
        Ok(result) => Ok(warp::reply::json(&result)),
        Err(e) => {
            log::error!("Advice search error: {}", e);
            Err(reject::custom(UpstreamFailure {
                message: "Failed to search advice.".to_string(),
            }))
        }
    }
}

pub fn build_inspire_routes(
    service: InspireService,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let inspire = warp::path!("api" / "inspire")
        .and(warp::get())
        .and(warp::query::<Vec<(String, String)>>())
        .and(with_service(service.clone()))
        .and_then(get_inspiration);

    let advice_search = warp::path!("api" / "inspire" / "advice" / "search")
        .and(warp::get())
        .and(warp::query::<AdviceSearchQuery>())
        .and(with_service(service))
        .and_then(search_advice);

    inspire.or(advice_search)
}
