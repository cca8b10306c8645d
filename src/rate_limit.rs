use clokwerk::{Scheduler, TimeUnits};
use log::{debug, info};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use warp::{reject, Filter, Rejection, Reply};

use crate::config::RateLimitConfig;

/// Remaining quota after a request was admitted, rendered as
/// `RateLimit-*` response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateQuota {
    pub limit: u32,
    pub remaining: u32,
    pub reset_secs: u64,
}

impl RateQuota {
    pub fn decorate(self, reply: impl Reply) -> impl Reply {
        let reply = warp::reply::with_header(reply, "ratelimit-limit", self.limit.to_string());
        let reply =
            warp::reply::with_header(reply, "ratelimit-remaining", self.remaining.to_string());
        warp::reply::with_header(reply, "ratelimit-reset", self.reset_secs.to_string())
    }
}

#[derive(Debug)]
pub struct RateLimited {
    pub quota: RateQuota,
}

impl reject::Reject for RateLimited {}

struct Window {
    started: Instant,
    hits: HashMap<IpAddr, u32>,
}

/// Fixed-window request counter keyed by client IP.
///
/// All counters share one window. It rolls over lazily on the first hit past
/// its end, and [`RateLimiter::start_sweeper`] additionally clears it on a
/// timer so idle clients do not linger in memory.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    window: Arc<Mutex<Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            window: Arc::new(Mutex::new(Window {
                started: Instant::now(),
                hits: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Window> {
        self.window.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Counts one request from `ip`, returning the quota left or the
    /// rejection once the cap is exceeded.
    pub fn hit(&self, ip: IpAddr) -> Result<RateQuota, RateLimited> {
        self.hit_at(ip, Instant::now())
    }

    fn hit_at(&self, ip: IpAddr, now: Instant) -> Result<RateQuota, RateLimited> {
        let mut window = self.lock();
        if now.duration_since(window.started) >= self.config.window {
            window.started = now;
            window.hits.clear();
        }

        let elapsed = now.duration_since(window.started);
        let reset_secs = self.config.window.saturating_sub(elapsed).as_secs_f64().ceil() as u64;

        let hits = window.hits.entry(ip).or_insert(0);
        *hits = hits.saturating_add(1);

        let quota = RateQuota {
            limit: self.config.max_requests,
            remaining: self.config.max_requests.saturating_sub(*hits),
            reset_secs,
        };

        if *hits > self.config.max_requests {
            debug!("Rate limit exceeded for {} ({} hits)", ip, hits);
            Err(RateLimited { quota })
        } else {
            Ok(quota)
        }
    }

    pub fn reset(&self) {
        let mut window = self.lock();
        window.started = Instant::now();
        window.hits.clear();
    }

    pub fn tracked_clients(&self) -> usize {
        self.lock().hits.len()
    }

    /// Clears every counter once per window on a background thread.
    pub fn start_sweeper(&self) -> JoinHandle<()> {
        let mut scheduler = Scheduler::new();
        let limiter = self.clone();
        let window_secs = self.config.window.as_secs().max(1) as u32;

        scheduler.every(window_secs.seconds()).run(move || {
            info!(
                "Resetting rate limit window ({} clients tracked)",
                limiter.tracked_clients()
            );
            limiter.reset();
        });

        thread::spawn(move || loop {
            scheduler.run_pending();
            thread::sleep(Duration::from_secs(1));
        })
    }
}

/// Admits or rejects the request, extracting the remaining quota.
///
/// Requests without a known peer address share one bucket.
pub fn rate_limit(
    limiter: RateLimiter,
) -> impl Filter<Extract = (RateQuota,), Error = Rejection> + Clone {
    warp::addr::remote().and_then(move |addr: Option<SocketAddr>| {
        let limiter = limiter.clone();
        async move {
            let ip = addr
                .map(|addr| addr.ip())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
            limiter.hit(ip).map_err(reject::custom)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(window_secs),
        })
    }

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_admits_up_to_the_cap() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        let remaining: Vec<u32> = (0..3)
            .map(|_| limiter.hit_at(ip(1), now).unwrap().remaining)
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);

        let rejected = limiter.hit_at(ip(1), now).unwrap_err();
        assert_eq!(rejected.quota.remaining, 0);
        assert_eq!(rejected.quota.limit, 3);
    }

    #[test]
    fn test_clients_are_counted_separately() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.hit_at(ip(1), now).is_ok());
        assert!(limiter.hit_at(ip(1), now).is_err());
        assert!(limiter.hit_at(ip(2), now).is_ok());
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_window_rolls_over() {
        let limiter = limiter(1, 60);
        let start = Instant::now();

        assert!(limiter.hit_at(ip(1), start).is_ok());
        assert!(limiter.hit_at(ip(1), start + Duration::from_secs(30)).is_err());

        let quota = limiter
            .hit_at(ip(1), start + Duration::from_secs(61))
            .unwrap();
        assert_eq!(quota.remaining, 0);
        assert_eq!(quota.reset_secs, 60);
    }

    #[test]
    fn test_reset_clears_counters() {
        let limiter = limiter(1, 60);
        assert!(limiter.hit(ip(1)).is_ok());
        assert!(limiter.hit(ip(1)).is_err());

        limiter.reset();

        assert_eq!(limiter.tracked_clients(), 0);
        assert!(limiter.hit(ip(1)).is_ok());
    }

    #[tokio::test]
    async fn test_filter_rejects_over_limit() {
        let filter = rate_limit(limiter(1, 60)).map(|quota: RateQuota| quota.decorate("ok"));
        let addr: SocketAddr = "192.168.1.20:5000".parse().unwrap();

        let response = warp::test::request()
            .remote_addr(addr)
            .reply(&filter)
            .await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["ratelimit-limit"], "1");
        assert_eq!(response.headers()["ratelimit-remaining"], "0");

        let rejection = warp::test::request()
            .remote_addr(addr)
            .filter(&filter)
            .await
            .err()
            .unwrap();
        assert!(rejection.find::<RateLimited>().is_some());
    }
}
