//! Where is the visitor? Geolocation sources.
//!
//! `IpGeolocation` asks an ipapi.co-compatible endpoint, `FixedGeolocation`
//! returns a configured position, and `ConsentGate` wraps either one so that
//! nothing is looked up unless the visitor agreed to share their position.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::LookupError;
use crate::http::{parse_endpoint, HttpClient};
use crate::types::Coordinates;

#[async_trait]
pub trait GeolocationSource: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Determine the current position.
    async fn locate(&self) -> Result<Coordinates, LookupError>;
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// Approximate position from the public IP address
#[derive(Debug, Clone)]
pub struct IpGeolocation {
    http: HttpClient,
    endpoint: Url,
}

impl IpGeolocation {
    pub fn new(http: HttpClient, endpoint: &str) -> Result<Self, LookupError> {
        Ok(Self {
            http,
            endpoint: parse_endpoint(endpoint, "services.geolocation_url")?,
        })
    }
}

/// IP lookups are city-level at best.
const IP_ACCURACY_METERS: f64 = 25_000.0;

#[async_trait]
impl GeolocationSource for IpGeolocation {
    fn name(&self) -> &str {
        "ip"
    }

    async fn locate(&self) -> Result<Coordinates, LookupError> {
        let body: IpApiResponse = self.http.get_json(&self.endpoint, &[]).await?;

        if body.error {
            let reason = body.reason.unwrap_or_else(|| "unknown".to_string());
            return Err(LookupError::PositionUnavailable(reason));
        }

        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates {
                latitude,
                longitude,
                accuracy_meters: Some(IP_ACCURACY_METERS),
            }),
            _ => Err(LookupError::PositionUnavailable(
                "response carried no coordinates".to_string(),
            )),
        }
    }
}

/// A position taken from configuration
#[derive(Debug, Clone)]
pub struct FixedGeolocation {
    coordinates: Coordinates,
}

impl FixedGeolocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinates: Coordinates::new(latitude, longitude),
        }
    }
}

#[async_trait]
impl GeolocationSource for FixedGeolocation {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn locate(&self) -> Result<Coordinates, LookupError> {
        Ok(self.coordinates)
    }
}

/// Refuses to locate without consent, otherwise defers to the inner source.
pub struct ConsentGate<S> {
    inner: S,
    granted: bool,
}

impl<S: GeolocationSource> ConsentGate<S> {
    pub fn new(inner: S, granted: bool) -> Self {
        Self { inner, granted }
    }
}

#[async_trait]
impl<S: GeolocationSource> GeolocationSource for ConsentGate<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn locate(&self) -> Result<Coordinates, LookupError> {
        if !self.granted {
            return Err(LookupError::PermissionDenied);
        }
        self.inner.locate().await
    }
}
