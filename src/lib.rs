pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod logging;
pub mod observability;
pub mod pipeline;

// Domain data shapes shared across layers
pub mod domain;
