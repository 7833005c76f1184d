use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const GEOCODE_URL: &str = "https://geocode.maps.co/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One result object from the provider's JSON array. Coordinates come back
/// as strings and are carried through to the CSV untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeHit {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed geocoding response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Address-to-coordinates lookup. `Ok(None)` means the provider returned an
/// empty result array for the address.
pub trait Geocode {
    fn lookup(&self, address: &str) -> Result<Option<GeocodeHit>, GeocodeError>;
}

pub struct GeocodeClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeocodeClient {
    pub fn new(api_key: String) -> Result<Self, GeocodeError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(GeocodeClient {
            client,
            api_key,
            endpoint: GEOCODE_URL.to_string(),
        })
    }
}

impl Geocode for GeocodeClient {
    fn lookup(&self, address: &str) -> Result<Option<GeocodeHit>, GeocodeError> {
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[("q", address), ("api_key", &self.api_key)])
            .send()?
            .text()?;
        let hits: Vec<GeocodeHit> = serde_json::from_str(&body)?;
        Ok(hits.into_iter().next())
    }
}
