use log::warn;
use rand::seq::IndexedRandom;
use std::sync::Arc;

use crate::models::{Activity, ActivityFilter, AdviceSearchResult, InspirationResult, Quote};
use crate::upstream::{InspirationUpstream, UpstreamError, UpstreamResult};

pub const NO_ACTIVITY_FOUND: &str = "No activity found for the given filters.";
pub const ACTIVITY_FAILED: &str = "Failed to fetch activity.";
pub const ADVICE_FAILED: &str = "Failed to fetch advice.";
pub const QUOTE_FAILED: &str = "Failed to fetch motivational quote.";
pub const QUOTE_RATE_LIMITED: &str =
    "Too many requests for motivational quotes. Please try again later.";

/// Aggregates the three upstream lookups.
///
/// Failures are tolerated per field: a failing upstream leaves its value null
/// and sets the matching error message, the other two are still returned.
#[derive(Clone)]
pub struct InspireService {
    upstream: Arc<dyn InspirationUpstream>,
}

impl InspireService {
    pub fn new(upstream: Arc<dyn InspirationUpstream>) -> Self {
        Self { upstream }
    }

    pub async fn fetch_inspiration(&self, filter: &ActivityFilter) -> InspirationResult {
        let (activity, advice, quote) = tokio::join!(
            self.fetch_activity(filter),
            self.fetch_advice(),
            self.fetch_quote()
        );

        InspirationResult::from_parts(activity, advice, quote)
    }

    pub async fn search_advice(&self, keyword: &str) -> UpstreamResult<AdviceSearchResult> {
        self.upstream.search_advice(keyword).await
    }

    async fn fetch_activity(&self, filter: &ActivityFilter) -> Result<Activity, String> {
        if !filter.is_set() {
            return self.upstream.random_activity().await.map_err(|e| {
                warn!("Random activity lookup failed: {}", e);
                ACTIVITY_FAILED.to_string()
            });
        }

        match self.upstream.filtered_activities(filter).await {
            Ok(activities) => activities
                .choose(&mut rand::rng())
                .cloned()
                .ok_or_else(|| NO_ACTIVITY_FOUND.to_string()),
            // The Bored API answers 404 when a filter matches nothing
            Err(UpstreamError::Status(404)) => Err(NO_ACTIVITY_FOUND.to_string()),
            Err(e) => {
                warn!("Filtered activity lookup failed: {}", e);
                Err(ACTIVITY_FAILED.to_string())
            }
        }
    }

    async fn fetch_advice(&self) -> Result<String, String> {
        self.upstream.random_advice().await.map_err(|e| {
            warn!("Advice lookup failed: {}", e);
            ADVICE_FAILED.to_string()
        })
    }

    async fn fetch_quote(&self) -> Result<Quote, String> {
        self.upstream.random_quote().await.map_err(|e| {
            warn!("Quote lookup failed: {}", e);
            if e.is_rate_limited() {
                QUOTE_RATE_LIMITED.to_string()
            } else {
                QUOTE_FAILED.to_string()
            }
        })
    }
}
