use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub activity_api_url: String,
    pub advice_api_url: String,
    pub quote_api_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub upstream: UpstreamConfig,
    pub rate_limit: RateLimitConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            host: env::var("BOREDOM_BUSTER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            upstream: UpstreamConfig {
                activity_api_url: base_url("BOREDOM_BUSTER_ACTIVITY_API_URL", DEFAULT_ACTIVITY_API),
                advice_api_url: base_url("BOREDOM_BUSTER_ADVICE_API_URL", DEFAULT_ADVICE_API),
                quote_api_url: base_url("BOREDOM_BUSTER_QUOTE_API_URL", DEFAULT_QUOTE_API),
                timeout: Duration::from_secs(
                    env::var("BOREDOM_BUSTER_UPSTREAM_TIMEOUT_SECS")
                        .unwrap_or_else(|_| "10".to_string())
                        .parse()?,
                ),
            },
            rate_limit: RateLimitConfig {
                max_requests: env::var("BOREDOM_BUSTER_RATE_LIMIT_MAX")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()?,
                window: Duration::from_secs(
                    env::var("BOREDOM_BUSTER_RATE_LIMIT_WINDOW_SECS")
                        .unwrap_or_else(|_| "900".to_string())
                        .parse()?,
                ),
            },
        })
    }
}

pub const DEFAULT_ACTIVITY_API: &str = "https://bored-api.appbrewery.com";
pub const DEFAULT_ADVICE_API: &str = "https://api.adviceslip.com";
pub const DEFAULT_QUOTE_API: &str = "https://zenquotes.io";

impl Default for RateLimitConfig {
    /// 100 requests per 15 minutes.
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

/// Base URLs are joined with absolute paths, so a trailing slash is dropped.
fn base_url(var: &str, default: &str) -> String {
    env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
