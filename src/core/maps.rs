//! Google Directions client and the distance-oracle seam.
//!
//! The [`DistanceOracle`] trait is the only I/O boundary in a run; the store
//! consults it once per never-measured pair. [`GoogleMapsOracle`] implements
//! it against the Directions API, taking the shortest route over both travel
//! directions and all returned alternatives.

use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;

use crate::core::error::{Error, Result};

/// Conversion factor for route distances reported in meters.
pub const METERS_TO_MILES: f64 = 0.00062;

/// Maximum number of retry attempts for network errors
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// Global HTTP client shared by all queries
static GLOBAL_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(format!("schoolmiles/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
});

/// Source of shortest driving distances between two query addresses.
///
/// Implementations return miles, unrounded; rounding up to the nearest
/// tenth happens exactly once, when the store records a fresh measurement.
#[async_trait]
pub trait DistanceOracle: Send + Sync {
    async fn query(&self, origin: &str, dest: &str) -> Result<f64>;
}

/// Configuration for the directions endpoint
pub struct MapsConfig {
    /// URL of the Directions API JSON endpoint
    pub directions_url: String,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            directions_url: "https://maps.googleapis.com/maps/api/directions/json".to_string(),
        }
    }
}

/// Directions-API-backed oracle
pub struct GoogleMapsOracle {
    api_key: String,
    config: MapsConfig,
}

impl GoogleMapsOracle {
    /// Create an oracle against the production endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(api_key, MapsConfig::default())
    }

    /// Create an oracle with a custom endpoint configuration.
    pub fn with_config(api_key: impl Into<String>, config: MapsConfig) -> Self {
        Self {
            api_key: api_key.into(),
            config,
        }
    }

    /// One directed directions request; returns each route's first-leg
    /// distance in meters.
    async fn route_meters(&self, origin: &str, dest: &str) -> Result<Vec<u64>> {
        let response = GLOBAL_CLIENT
            .get(&self.config.directions_url)
            .query(&[
                ("origin", origin),
                ("destination", dest),
                ("mode", "driving"),
                ("alternatives", "true"),
                ("units", "imperial"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(Error::Network(format!("directions request failed: {status}")));
        }
        if !status.is_success() {
            return Err(Error::QueryFailed(format!("directions request failed: {status}")));
        }

        let body: DirectionsResponse = response.json().await?;
        match body.status.as_str() {
            "OK" => Ok(body
                .routes
                .iter()
                .filter_map(|route| route.legs.first())
                .map(|leg| leg.distance.value)
                .collect()),
            // Transient server-side failure, worth retrying.
            "UNKNOWN_ERROR" => Err(Error::Network(format!(
                "directions backend error for {origin} -> {dest}"
            ))),
            other => {
                let detail = body.error_message.unwrap_or_default();
                Err(Error::QueryFailed(format!(
                    "{origin} -> {dest}: {other} {detail}"
                )))
            }
        }
    }
}

#[async_trait]
impl DistanceOracle for GoogleMapsOracle {
    async fn query(&self, origin: &str, dest: &str) -> Result<f64> {
        // Shortest possible distance when traveling in either direction.
        let mut meters = retry_on_network_error(|| self.route_meters(origin, dest)).await?;
        meters.extend(retry_on_network_error(|| self.route_meters(dest, origin)).await?);

        let shortest = meters.into_iter().min().ok_or_else(|| {
            Error::QueryFailed(format!("no routes returned for {origin} -> {dest}"))
        })?;
        Ok(shortest as f64 * METERS_TO_MILES)
    }
}

/// Stand-in oracle for runs without an API key. Any query reaching it means
/// the loaded cache did not cover every distinct pair.
pub struct CacheOnlyOracle;

#[async_trait]
impl DistanceOracle for CacheOnlyOracle {
    async fn query(&self, origin: &str, dest: &str) -> Result<f64> {
        Err(Error::QueryFailed(format!(
            "no cached distance for {origin} -> {dest} and no API key was provided"
        )))
    }
}

/// Execute an operation with retry logic for network errors
async fn retry_on_network_error<F, Fut, T>(operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(Error::Network(msg)) if attempt < MAX_RETRY_ATTEMPTS => {
                attempt += 1;
                let delay = BASE_RETRY_DELAY_MS * (1 << (attempt - 1));
                warn!("network error (attempt {attempt}): {msg}, retrying in {delay}ms");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    legs: Vec<RouteLeg>,
}

#[derive(Debug, Deserialize)]
struct RouteLeg {
    distance: DistanceValue,
}

#[derive(Debug, Deserialize)]
struct DistanceValue {
    value: u64,
}
