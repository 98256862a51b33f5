// src/config/mod.rs
pub mod aggregator;
pub mod server;

pub use aggregator::AggregatorConfig;
pub use server::ServerConfig;
