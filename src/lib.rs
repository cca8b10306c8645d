pub mod client;
pub mod config;
pub mod handlers_health;
pub mod handlers_inspire;
pub mod handlers_static;
pub mod history;
pub mod inspire_service;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod upstream;
pub mod validation;
pub mod warp_helpers;
