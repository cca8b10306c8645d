use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Activity categories understood by the activity upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Education,
    Recreational,
    Social,
    Diy,
    Charity,
    Cooking,
    Relaxation,
    Music,
    Busywork,
}

impl ActivityType {
    pub const ALL: [ActivityType; 9] = [
        ActivityType::Education,
        ActivityType::Recreational,
        ActivityType::Social,
        ActivityType::Diy,
        ActivityType::Charity,
        ActivityType::Cooking,
        ActivityType::Relaxation,
        ActivityType::Music,
        ActivityType::Busywork,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Education => "education",
            ActivityType::Recreational => "recreational",
            ActivityType::Social => "social",
            ActivityType::Diy => "diy",
            ActivityType::Charity => "charity",
            ActivityType::Cooking => "cooking",
            ActivityType::Relaxation => "relaxation",
            ActivityType::Music => "music",
            ActivityType::Busywork => "busywork",
        }
    }
}

impl FromStr for ActivityType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated `/api/inspire` query.
///
/// `price`, `accessibility` and `key` are accepted for compatibility with the
/// original Bored API but the activity upstream cannot filter on them, so only
/// `kind` and `participants` are ever forwarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityFilter {
    pub kind: Option<ActivityType>,
    pub participants: Option<u8>,
    pub price: Option<f64>,
    pub accessibility: Option<f64>,
    pub key: Option<String>,
}

impl ActivityFilter {
    pub fn is_set(&self) -> bool {
        self.kind.is_some()
            || self.participants.is_some()
            || self.price.is_some()
            || self.accessibility.is_some()
            || self.key.is_some()
    }

    /// Query pairs for the filtered-list endpoint.
    pub fn upstream_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(kind) = self.kind {
            params.push(("type", kind.as_str().to_string()));
        }
        if let Some(participants) = self.participants {
            params.push(("participants", participants.to_string()));
        }
        params
    }
}

/// One activity suggestion. Fields this service does not look at are kept in
/// `extra` so the upstream object is passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub activity: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub participants: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

/// Combined `/api/inspire` payload. Each value is null exactly when its
/// matching `*Error` field carries a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspirationResult {
    pub activity: Option<Activity>,
    pub activity_error: Option<String>,
    pub advice: Option<String>,
    pub advice_error: Option<String>,
    pub quote: Option<Quote>,
    pub quote_error: Option<String>,
}

impl InspirationResult {
    pub fn from_parts(
        activity: Result<Activity, String>,
        advice: Result<String, String>,
        quote: Result<Quote, String>,
    ) -> Self {
        let (activity, activity_error) = split(activity);
        let (advice, advice_error) = split(advice);
        let (quote, quote_error) = split(quote);

        Self {
            activity,
            activity_error,
            advice,
            advice_error,
            quote,
            quote_error,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.activity.is_some() && self.advice.is_some() && self.quote.is_some()
    }
}

fn split<T>(result: Result<T, String>) -> (Option<T>, Option<String>) {
    match result {
        Ok(value) => (Some(value), None),
        Err(message) => (None, Some(message)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceSearchResult {
    pub total_results: u32,
    pub slips: Vec<String>,
}

impl AdviceSearchResult {
    pub fn empty() -> Self {
        Self {
            total_results: 0,
            slips: Vec::new(),
        }
    }
}
