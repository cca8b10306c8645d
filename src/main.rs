use log::{error, info};
use mimalloc::MiMalloc;
use std::net::{IpAddr, TcpListener};
use std::sync::Arc;

use boredom_buster::config::Config;
use boredom_buster::inspire_service::InspireService;
use boredom_buster::rate_limit::RateLimiter;
use boredom_buster::routes::build_routes;
use boredom_buster::upstream::HttpUpstream;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = Config::from_env()?;
    let host: IpAddr = config.host.parse()?;
    let port = config.port;

    info!("Starting Boredom Buster server on port {}", port);
    info!("Activity API: {}", config.upstream.activity_api_url);
    info!("Advice API: {}", config.upstream.advice_api_url);
    info!("Quote API: {}", config.upstream.quote_api_url);
    info!("Upstream timeout: {:?}", config.upstream.timeout);
    info!(
        "Rate limit: {} requests per {:?}",
        config.rate_limit.max_requests, config.rate_limit.window
    );

    if !is_port_available(host, port) {
        error!(
            "Port {} is already in use. Please stop the other process or set PORT to a different value.",
            port
        );
        error!(
            "You can check what's using the port with: lsof -i :{}",
            port
        );
        return Err(format!("Port {} is already in use", port).into());
    }

    let upstream = Arc::new(HttpUpstream::new(config.upstream.clone()));
    let service = InspireService::new(upstream);

    let limiter = RateLimiter::new(config.rate_limit.clone());
    let _sweeper_handle = limiter.start_sweeper();

    let routes = build_routes(service, limiter);

    info!(
        "Server started successfully, listening on http://localhost:{}",
        port
    );

    warp::serve(routes).run((host, port)).await;

    Ok(())
}

fn is_port_available(host: IpAddr, port: u16) -> bool {
    TcpListener::bind((host, port)).is_ok()
}
