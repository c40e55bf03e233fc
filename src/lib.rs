pub mod adapters;
pub mod analyzers;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod loader;
pub mod model;
pub mod output;
pub mod session;
