//! Blocking client for the backend's own HTTP API, used by the terminal
//! front end. Rendering helpers produce plain text so they can be tested
//! without a terminal.

use serde::Deserialize;
use std::fmt::Write as _;
use std::time::Duration;

use crate::history::History;
use crate::models::{ActivityType, AdviceSearchResult, InspirationResult};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),
    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Malformed server response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ServerError {
    error: String,
}

pub struct BoredomClient {
    agent: ureq::Agent,
    base_url: String,
}

impl BoredomClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();

        Self {
            agent: ureq::Agent::new_with_config(config),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn fetch_inspiration(
        &self,
        kind: Option<ActivityType>,
        participants: Option<u8>,
    ) -> Result<InspirationResult, ClientError> {
        let mut query = Vec::new();
        if let Some(kind) = kind {
            query.push(("type", kind.as_str().to_string()));
        }
        if let Some(participants) = participants {
            query.push(("participants", participants.to_string()));
        }
        self.get_json(&format!("{}/api/inspire", self.base_url), &query)
    }

    pub fn search_advice(&self, keyword: &str) -> Result<AdviceSearchResult, ClientError> {
        self.get_json(
            &format!("{}/api/inspire/advice/search", self.base_url),
            &[("q", keyword.to_string())],
        )
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let mut request = self.agent.get(url);
        for (key, value) in query {
            request = request.query(*key, value);
        }

        let mut response = request.call()?;
        let status = response.status();
        let body = response.body_mut().read_to_string()?;

        if !status.is_success() {
            let message = serde_json::from_str::<ServerError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

pub fn render_inspiration(result: &InspirationResult) -> String {
    let mut out = String::new();

    match &result.activity {
        Some(act) => {
            let _ = writeln!(out, "Activity: {}", act.activity);
            let _ = writeln!(
                out,
                "          Type: {} | Participants: {} | Duration: {}",
                act.kind,
                act.participants,
                act.duration.as_deref().unwrap_or("N/A")
            );
        }
        None => {
            let _ = writeln!(out, "Activity: {}", field_error(&result.activity_error));
        }
    }

    let advice = result
        .advice
        .clone()
        .unwrap_or_else(|| field_error(&result.advice_error));
    let _ = writeln!(out, "Advice:   {}", advice);

    match &result.quote {
        Some(quote) => {
            let _ = writeln!(out, "Quote:    \"{}\" - {}", quote.text, quote.author);
        }
        None => {
            let _ = writeln!(out, "Quote:    {}", field_error(&result.quote_error));
        }
    }

    out
}

/// Placeholder block shown when the whole request failed.
pub fn render_failure() -> String {
    [
        "Activity: Could not load activity.",
        "Advice:   Could not load advice.",
        "Quote:    Could not load quote.",
        "",
    ]
    .join("\n")
}

pub fn render_search(keyword: &str, result: &AdviceSearchResult) -> String {
    let mut out = format!("{} result(s) for '{}'\n", result.total_results, keyword);
    for (i, slip) in result.slips.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", i + 1, slip);
    }
    out
}

pub fn render_history(history: &History) -> String {
    if history.is_empty() {
        return "No history yet.\n".to_string();
    }

    let mut out = String::new();
    for (i, entry) in history.entries().iter().enumerate() {
        let activity = entry
            .activity
            .as_ref()
            .map(|a| a.activity.as_str())
            .unwrap_or("No activity available");
        let advice = entry.advice.as_deref().unwrap_or("No advice available");
        let quote = entry
            .quote
            .as_ref()
            .map(|q| format!("\"{}\" - {}", q.text, q.author))
            .unwrap_or_else(|| "No quote available".to_string());

        let _ = writeln!(out, "{:>2}. [{}]", i + 1, entry.timestamp);
        let _ = writeln!(out, "    Activity: {}", activity);
        let _ = writeln!(out, "    Advice:   {}", advice);
        let _ = writeln!(out, "    Quote:    {}", quote);
    }
    out
}

fn field_error(error: &Option<String>) -> String {
    error.clone().unwrap_or_else(|| "Not available.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryEntry;
    use crate::models::{Activity, Quote};

    fn result() -> InspirationResult {
        InspirationResult::from_parts(
            Ok(Activity {
                activity: "Play frisbee".to_string(),
                kind: "recreational".to_string(),
                participants: 2,
                duration: None,
                extra: serde_json::Map::new(),
            }),
            Ok("Be kind.".to_string()),
            Err("Too many requests for motivational quotes. Please try again later.".to_string()),
        )
    }

    #[test]
    fn test_render_inspiration_shows_fields_and_errors() {
        let text = render_inspiration(&result());
        assert!(text.contains("Activity: Play frisbee"));
        assert!(text.contains("Participants: 2 | Duration: N/A"));
        assert!(text.contains("Advice:   Be kind."));
        assert!(text.contains("Quote:    Too many requests"));
    }

    #[test]
    fn test_render_failure_placeholders() {
        let text = render_failure();
        assert!(text.contains("Could not load activity."));
        assert!(text.contains("Could not load advice."));
        assert!(text.contains("Could not load quote."));
    }

    #[test]
    fn test_render_search() {
        let text = render_search(
            "love",
            &AdviceSearchResult {
                total_results: 2,
                slips: vec!["Love yourself.".to_string(), "Love others.".to_string()],
            },
        );
        assert_eq!(
            text,
            "2 result(s) for 'love'\n  1. Love yourself.\n  2. Love others.\n"
        );
    }

    #[test]
    fn test_render_history() {
        assert_eq!(render_history(&History::new()), "No history yet.\n");

        let mut history = History::new();
        history.push(HistoryEntry {
            activity: None,
            advice: Some("Be kind.".to_string()),
            quote: Some(Quote {
                text: "Stay curious.".to_string(),
                author: "Anon".to_string(),
            }),
            timestamp: "2026-10-16 09:30:00".to_string(),
        });

        let text = render_history(&history);
        assert!(text.starts_with(" 1. [2026-10-16 09:30:00]"));
        assert!(text.contains("Activity: No activity available"));
        assert!(text.contains("Quote:    \"Stay curious.\" - Anon"));
    }
}
