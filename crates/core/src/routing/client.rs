//! HTTP client for the routing API.
//!
//! Speaks the OSRM route interface: one GET per ordered stop pair, best
//! route taken, shaped into a [`Leg`] for the timeline layer.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Semaphore;

use daytrip_itinerary::models::types::{Leg, RouteStep, Stop, TravelMode};

#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Base URL of the routing server, no trailing slash.
    #[serde(default = "RoutingConfig::default_base_url")]
    pub base_url: String,
    /// Routing profile segment, e.g. "driving" or "foot" (default: driving)
    #[serde(default = "RoutingConfig::default_profile")]
    pub profile: String,
    /// Whole-request timeout in seconds (default: 30)
    #[serde(default = "RoutingConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connect timeout in seconds (default: 10)
    #[serde(default = "RoutingConfig::default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Maximum in-flight requests to the routing server (default: 10)
    #[serde(default = "RoutingConfig::default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            profile: Self::default_profile(),
            timeout_secs: Self::default_timeout_secs(),
            connect_timeout_secs: Self::default_connect_timeout_secs(),
            max_concurrent_requests: Self::default_max_concurrent_requests(),
        }
    }
}

impl RoutingConfig {
    fn default_base_url() -> String {
        "https://router.project-osrm.org".to_string()
    }
    fn default_profile() -> String {
        "driving".to_string()
    }
    fn default_timeout_secs() -> u64 {
        30
    }
    fn default_connect_timeout_secs() -> u64 {
        10
    }
    fn default_max_concurrent_requests() -> usize {
        10
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("API error: {0}")]
    Api(String),
}

pub struct RoutingClient {
    client: Client,
    config: RoutingConfig,
    /// Semaphore to limit concurrent requests
    rate_limiter: Arc<Semaphore>,
}

impl RoutingClient {
    pub fn new(config: RoutingConfig) -> Result<Self, RoutingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| RoutingError::Network(format!("Failed to build HTTP client: {e}")))?;
        let rate_limiter = Arc::new(Semaphore::new(config.max_concurrent_requests));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Fetch the best route between two stops.
    pub async fn route(&self, from: &Stop, to: &Stop) -> Result<Leg, RoutingError> {
        let _permit = self
            .rate_limiter
            .acquire()
            .await
            .map_err(|e| RoutingError::Network(e.to_string()))?;

        let url = format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&steps=true",
            self.config.base_url,
            self.config.profile,
            from.location.x(),
            from.location.y(),
            to.location.x(),
            to.location.y(),
        );
        tracing::debug!(from = %from.id, to = %to.id, "requesting route");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RoutingError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(RoutingError::Api(format!("HTTP error: {}", response.status())));
        }
        let body: RouteResponse = response
            .json()
            .await
            .map_err(|e| RoutingError::Parse(e.to_string()))?;

        route_to_leg(from.clone(), to.clone(), body)
    }
}

// ---- Wire shapes ----

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<ApiRoute>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    duration: f64,
    distance: f64,
    #[serde(default)]
    geometry: String,
    #[serde(default)]
    legs: Vec<ApiLeg>,
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    #[serde(default)]
    steps: Vec<ApiStep>,
}

#[derive(Debug, Deserialize)]
struct ApiStep {
    duration: f64,
    distance: f64,
    #[serde(default)]
    mode: String,
    #[serde(default)]
    name: String,
}

/// Shape the best returned route into a leg between the two stops.
/// Durations are rounded to whole seconds.
fn route_to_leg(from: Stop, to: Stop, response: RouteResponse) -> Result<Leg, RoutingError> {
    if response.code != "Ok" {
        return Err(RoutingError::Api(format!(
            "routing server answered code {}",
            response.code
        )));
    }
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| RoutingError::Api("no routes returned".to_string()))?;

    let steps = route
        .legs
        .into_iter()
        .flat_map(|leg| leg.steps)
        .map(|step| RouteStep {
            mode: TravelMode::from_api(&step.mode).unwrap_or(TravelMode::Drive),
            instruction: step.name,
            duration_seconds: step.duration.round() as u32,
            distance_meters: step.distance,
        })
        .collect();

    Ok(Leg {
        from,
        to,
        duration_seconds: route.duration.round() as u32,
        distance_meters: route.distance,
        geometry: route.geometry,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::Point;

    const RESPONSE: &str = r#"{
        "code": "Ok",
        "routes": [{
            "duration": 1799.6,
            "distance": 18204.3,
            "geometry": "_p~iF~ps|U_ulLnnqC",
            "legs": [{
                "steps": [
                    {"duration": 1500.2, "distance": 17000.0, "mode": "driving", "name": "A20"},
                    {"duration": 299.4, "distance": 1204.3, "mode": "walking", "name": "Museumpark"}
                ]
            }]
        }]
    }"#;

    fn stop(id: &str) -> Stop {
        Stop::new(id, id, Point::new(4.47, 51.92))
    }

    #[test]
    fn test_route_to_leg() {
        let response: RouteResponse = serde_json::from_str(RESPONSE).unwrap();
        let leg = route_to_leg(stop("a"), stop("b"), response).unwrap();

        assert_eq!(leg.duration_seconds, 1800);
        assert_relative_eq!(leg.distance_meters, 18204.3);
        assert_eq!(leg.geometry, "_p~iF~ps|U_ulLnnqC");
        assert_eq!(leg.steps.len(), 2);
        assert_eq!(leg.steps[0].mode, TravelMode::Drive);
        assert_eq!(leg.steps[0].duration_seconds, 1500);
        assert_eq!(leg.steps[1].mode, TravelMode::Walk);
        assert_eq!(leg.steps[1].instruction, "Museumpark");
        assert!(leg.connects(&stop("a").id, &stop("b").id));
    }

    #[test]
    fn test_error_code_is_rejected() {
        let response: RouteResponse =
            serde_json::from_str(r#"{"code": "NoRoute", "routes": []}"#).unwrap();
        let err = route_to_leg(stop("a"), stop("b"), response).unwrap_err();
        assert!(matches!(err, RoutingError::Api(_)));
    }

    #[test]
    fn test_ok_without_routes_is_rejected() {
        let response: RouteResponse =
            serde_json::from_str(r#"{"code": "Ok", "routes": []}"#).unwrap();
        assert!(route_to_leg(stop("a"), stop("b"), response).is_err());
    }

    #[test]
    fn test_config_defaults_from_empty_document() {
        let config: RoutingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.base_url, "https://router.project-osrm.org");
        assert_eq!(config.profile, "driving");
        assert_eq!(config.max_concurrent_requests, 10);

        let config: RoutingConfig =
            serde_json::from_str(r#"{"profile": "foot", "timeout_secs": 5}"#).unwrap();
        assert_eq!(config.profile, "foot");
        assert_eq!(config.timeout_secs, 5);
    }
}
