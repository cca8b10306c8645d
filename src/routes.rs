use warp::Filter;

use crate::handlers_health::build_health_routes;
use crate::handlers_inspire::build_inspire_routes;
use crate::handlers_static::build_static_routes;
use crate::inspire_service::InspireService;
use crate::rate_limit::{rate_limit, RateLimiter, RateQuota};
use crate::warp_helpers::{cors, handle_rejection};

/// Full filter tree: the static front end, then the rate-limited API and
/// health routes, wrapped in CORS, access logging and rejection recovery.
///
/// Rejections past the limiter are recovered inside the limited branch so
/// error replies carry the `RateLimit-*` headers too. Only the limiter's own
/// 429 reaches the outer recovery.
pub fn build_routes(
    service: InspireService,
    limiter: RateLimiter,
) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
    let api = build_health_routes()
        .or(build_inspire_routes(service))
        .recover(handle_rejection);

    let limited = rate_limit(limiter).and(api).map(RateQuota::decorate);

    build_static_routes()
        .or(limited)
        .with(cors())
        .with(warp::log("boredom_buster"))
        .recover(handle_rejection)
}
