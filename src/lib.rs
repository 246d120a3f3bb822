// Core modules
pub mod api;
pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod persistence;
pub mod secrets;
pub mod strategy;

// Re-export commonly used types
pub use api::*;
pub use error::{BotError, Result};
pub use models::*;
pub use strategy::PricingStrategy;
