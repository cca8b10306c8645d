//! Clients for the three third-party APIs: activity suggestions (Bored API),
//! advice (Advice Slip) and quotes (ZenQuotes).
//!
//! The service layer only sees [`InspirationUpstream`]; [`HttpUpstream`] is the
//! production implementation. Upstream payloads are decoded into typed structs
//! at this edge, so a shape change upstream surfaces as
//! [`UpstreamError::Payload`] instead of a missing field further in.

use async_trait::async_trait;
use log::debug;
use serde::de::Error as _;
use serde::Deserialize;

use crate::config::UpstreamConfig;
use crate::models::{Activity, ActivityFilter, AdviceSearchResult, Quote};

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("HTTP transport error: {0}")]
    Transport(String),
    #[error("Upstream responded with status {0}")]
    Status(u16),
    #[error("Malformed upstream payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("Upstream returned no {0}")]
    Empty(&'static str),
    #[error("Upstream task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl UpstreamError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, UpstreamError::Status(429))
    }
}

impl From<ureq::Error> for UpstreamError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => UpstreamError::Status(code),
            other => UpstreamError::Transport(other.to_string()),
        }
    }
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;

#[async_trait]
pub trait InspirationUpstream: Send + Sync {
    /// `GET /random` on the activity API.
    async fn random_activity(&self) -> UpstreamResult<Activity>;

    /// `GET /filter` on the activity API. A payload that is not a list is
    /// reported as no matches.
    async fn filtered_activities(&self, filter: &ActivityFilter) -> UpstreamResult<Vec<Activity>>;

    async fn random_advice(&self) -> UpstreamResult<String>;

    async fn search_advice(&self, keyword: &str) -> UpstreamResult<AdviceSearchResult>;

    async fn random_quote(&self) -> UpstreamResult<Quote>;
}

#[derive(Clone)]
pub struct HttpUpstream {
    agent: ureq::Agent,
    config: UpstreamConfig,
}

impl HttpUpstream {
    pub fn new(config: UpstreamConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build();

        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            config,
        }
    }

    /// Runs a blocking GET on the tokio blocking pool and returns the body.
    async fn get_text(
        &self,
        url: String,
        query: Vec<(&'static str, String)>,
    ) -> UpstreamResult<String> {
        let agent = self.agent.clone();
        debug!("Upstream GET {} {:?}", url, query);

        tokio::task::spawn_blocking(move || -> UpstreamResult<String> {
            let mut request = agent.get(&url);
            for (key, value) in &query {
                request = request.query(*key, value);
            }
            let mut response = request.call()?;
            Ok(response.body_mut().read_to_string()?)
        })
        .await?
    }
}

#[async_trait]
impl InspirationUpstream for HttpUpstream {
    async fn random_activity(&self) -> UpstreamResult<Activity> {
        let url = format!("{}/random", self.config.activity_api_url);
        parse_activity(&self.get_text(url, Vec::new()).await?)
    }

    async fn filtered_activities(&self, filter: &ActivityFilter) -> UpstreamResult<Vec<Activity>> {
        let url = format!("{}/filter", self.config.activity_api_url);
        parse_activity_list(&self.get_text(url, filter.upstream_params()).await?)
    }

    async fn random_advice(&self) -> UpstreamResult<String> {
        let url = format!("{}/advice", self.config.advice_api_url);
        parse_advice(&self.get_text(url, Vec::new()).await?)
    }

    async fn search_advice(&self, keyword: &str) -> UpstreamResult<AdviceSearchResult> {
        let url = format!(
            "{}/advice/search/{}",
            self.config.advice_api_url,
            urlencoding::encode(keyword)
        );
        parse_advice_search(&self.get_text(url, Vec::new()).await?)
    }

    async fn random_quote(&self) -> UpstreamResult<Quote> {
        let url = format!("{}/api/random", self.config.quote_api_url);
        parse_quote(&self.get_text(url, Vec::new()).await?)
    }
}

#[derive(Debug, Deserialize)]
struct AdviceSlip {
    advice: String,
}

#[derive(Debug, Deserialize)]
struct AdviceEnvelope {
    slip: AdviceSlip,
}

/// `total_results` arrives as a string from the Advice Slip API.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResultCount {
    Number(u32),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct AdviceSearchEnvelope {
    /// Present instead of results when nothing matched.
    message: Option<serde_json::Value>,
    total_results: Option<ResultCount>,
    #[serde(default)]
    slips: Vec<AdviceSlip>,
}

#[derive(Debug, Deserialize)]
struct ZenQuote {
    q: String,
    a: String,
}

pub fn parse_activity(body: &str) -> UpstreamResult<Activity> {
    Ok(serde_json::from_str(body)?)
}

pub fn parse_activity_list(body: &str) -> UpstreamResult<Vec<Activity>> {
    match serde_json::from_str::<serde_json::Value>(body)? {
        list @ serde_json::Value::Array(_) => Ok(serde_json::from_value(list)?),
        _ => Ok(Vec::new()),
    }
}

pub fn parse_advice(body: &str) -> UpstreamResult<String> {
    let envelope: AdviceEnvelope = serde_json::from_str(body)?;
    Ok(envelope.slip.advice)
}

pub fn parse_advice_search(body: &str) -> UpstreamResult<AdviceSearchResult> {
    let envelope: AdviceSearchEnvelope = serde_json::from_str(body)?;
    if envelope.message.is_some() {
        return Ok(AdviceSearchResult::empty());
    }

    let total_results = match envelope.total_results {
        Some(ResultCount::Number(count)) => count,
        Some(ResultCount::Text(text)) => text.trim().parse().map_err(|_| {
            serde_json::Error::custom(format!("invalid total_results: {:?}", text))
        })?,
        None => return Err(serde_json::Error::missing_field("total_results").into()),
    };

    Ok(AdviceSearchResult {
        total_results,
        slips: envelope.slips.into_iter().map(|slip| slip.advice).collect(),
    })
}

pub fn parse_quote(body: &str) -> UpstreamResult<Quote> {
    let quotes: Vec<ZenQuote> = serde_json::from_str(body)?;
    quotes
        .into_iter()
        .next()
        .map(|quote| Quote {
            text: quote.q,
            author: quote.a,
        })
        .ok_or(UpstreamError::Empty("quote"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_advice() {
        let body = r#"{"slip": {"id": 71, "advice": "Be kind."}}"#;
        assert_eq!(parse_advice(body).unwrap(), "Be kind.");

        assert!(matches!(
            parse_advice(r#"{"slips": []}"#),
            Err(UpstreamError::Payload(_))
        ));
    }

    #[test]
    fn test_parse_advice_search_with_matches() {
        let body = r#"{
            "total_results": "2",
            "query": "love",
            "slips": [
                {"id": 1, "advice": "Love yourself.", "date": "2014-06-03"},
                {"id": 2, "advice": "Love others.", "date": "2015-01-01"}
            ]
        }"#;

        let result = parse_advice_search(body).unwrap();
        assert_eq!(result.total_results, 2);
        assert_eq!(result.slips, vec!["Love yourself.", "Love others."]);
    }

    #[test]
    fn test_parse_advice_search_numeric_count() {
        let body = r#"{"total_results": 1, "slips": [{"advice": "Smile."}]}"#;
        assert_eq!(parse_advice_search(body).unwrap().total_results, 1);
    }

    #[test]
    fn test_parse_advice_search_no_matches() {
        let body = r#"{"message": {"type": "notice", "text": "No advice slips found matching that search term."}}"#;
        assert_eq!(parse_advice_search(body).unwrap(), AdviceSearchResult::empty());
    }

    #[test]
    fn test_parse_advice_search_rejects_garbage_count() {
        let body = r#"{"total_results": "lots", "slips": []}"#;
        assert!(matches!(
            parse_advice_search(body),
            Err(UpstreamError::Payload(_))
        ));
        assert!(parse_advice_search(r#"{"slips": []}"#).is_err());
    }

    #[test]
    fn test_parse_quote_takes_first_entry() {
        let body = r#"[{"q": "Stay curious.", "a": "Anon", "h": "<blockquote/>"}]"#;
        assert_eq!(
            parse_quote(body).unwrap(),
            Quote {
                text: "Stay curious.".to_string(),
                author: "Anon".to_string(),
            }
        );
        assert!(matches!(parse_quote("[]"), Err(UpstreamError::Empty("quote"))));
    }

    #[test]
    fn test_parse_activity_list_non_list_is_empty() {
        let body = r#"{"error": "No activities found with the specified filters"}"#;
        assert!(parse_activity_list(body).unwrap().is_empty());
        assert!(parse_activity_list("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_activity_list_rejects_malformed_entries() {
        assert!(matches!(
            parse_activity_list(r#"[{"activity": "Bake"}]"#),
            Err(UpstreamError::Payload(_))
        ));
    }

    #[test]
    fn test_rate_limited_status() {
        assert!(UpstreamError::Status(429).is_rate_limited());
        assert!(!UpstreamError::Status(500).is_rate_limited());
        assert!(!UpstreamError::Empty("quote").is_rate_limited());
    }
}
