//! Reverse geocoding of event coordinates into a searchable locality name.

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_GEOCODING_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Component types that mark a city-level address component
const LOCALITY_TYPES: [&str; 2] = ["locality", "political"];

#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GEOCODING_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(5),
        }
    }
}

impl FromEnv for GeocodingConfig {
    /// - GEOCODING_URL: defaults to the Google geocode JSON endpoint
    /// - GEOCODING_API_KEY: optional
    /// - GEOCODING_TIMEOUT_SECS: defaults to 5
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("GEOCODING_URL", DEFAULT_GEOCODING_URL),
            api_key: env_optional("GEOCODING_API_KEY"),
            timeout: Duration::from_secs(env_parse("GEOCODING_TIMEOUT_SECS", "5")?),
        })
    }
}

/// Resolves coordinates to the name users search events by
///
/// Lookups never fail: an unreachable or confused provider yields `None`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn searchable_location_name(&self, latitude: f64, longitude: f64) -> Option<String>;
}

/// Google Geocoding API client
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: Client,
    config: GeocodingConfig,
}

impl GoogleGeocoder {
    pub fn new(config: GeocodingConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl GeocodeResponse {
    /// Locality of the first result; the last matching component wins.
    fn locality(self) -> Option<String> {
        if self.status != "OK" {
            debug!(status = %self.status, "Geocoder returned no usable result");
            return None;
        }

        self.results
            .into_iter()
            .next()?
            .address_components
            .into_iter()
            .filter(|component| component.types == LOCALITY_TYPES)
            .last()
            .map(|component| component.long_name)
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn searchable_location_name(&self, latitude: f64, longitude: f64) -> Option<String> {
        let mut query = vec![("latlng", format!("{latitude},{longitude}"))];
        if let Some(key) = &self.config.api_key {
            query.push(("key", key.clone()));
        }

        let response = match self.client.get(&self.config.url).query(&query).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Geocoding request failed");
                return None;
            }
        };

        match response.json::<GeocodeResponse>().await {
            Ok(body) => body.locality(),
            Err(e) => {
                warn!(error = %e, "Malformed geocoding response");
                None
            }
        }
    }
}
