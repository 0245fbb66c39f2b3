pub mod aggregate;
pub mod client_state;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod provider;
pub mod rate_limit;
pub mod routes;
pub mod units;
