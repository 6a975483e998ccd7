use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::LookupError;
use crate::http::{parse_endpoint, HttpClient};
use crate::types::{Coordinates, Timezone};

#[async_trait]
pub trait TimezoneResolver: Send + Sync {
    /// Timezone in effect at `coordinates`.
    async fn resolve(&self, coordinates: &Coordinates) -> Result<Timezone, LookupError>;
}

#[derive(Debug, Deserialize)]
struct ForecastTimezone {
    timezone: Option<String>,
    utc_offset_seconds: Option<i32>,
}

/// Uses Open-Meteo's `timezone=auto`, which resolves the zone for a coordinate pair.
#[derive(Debug, Clone)]
pub struct OpenMeteoTimezone {
    http: HttpClient,
    endpoint: Url,
}

impl OpenMeteoTimezone {
    pub fn new(http: HttpClient, endpoint: &str) -> Result<Self, LookupError> {
        Ok(Self {
            http,
            endpoint: parse_endpoint(endpoint, "services.forecast_url")?,
        })
    }
}

#[async_trait]
impl TimezoneResolver for OpenMeteoTimezone {
    async fn resolve(&self, coordinates: &Coordinates) -> Result<Timezone, LookupError> {
        let query = [
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("timezone", "auto".to_string()),
            ("forecast_days", "1".to_string()),
        ];

        let body: ForecastTimezone = self.http.get_json(&self.endpoint, &query).await?;

        match (body.timezone, body.utc_offset_seconds) {
            (Some(name), Some(offset)) if !name.is_empty() => {
                tracing::info!("Resolved timezone {} (UTC{:+}s)", name, offset);
                Ok(Timezone {
                    name,
                    offset_minutes: offset / 60,
                })
            }
            _ => Err(LookupError::Parse(
                "forecast response carried no timezone".to_string(),
            )),
        }
    }
}
