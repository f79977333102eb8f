//! Remote routing API client and leg caching.

pub mod cache;
pub mod client;

pub use cache::CachingLegProvider;
pub use client::{RoutingClient, RoutingConfig, RoutingError};
