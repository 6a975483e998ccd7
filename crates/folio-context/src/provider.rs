//! Current weather via the Open-Meteo forecast API (no API key required).

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use url::Url;

use crate::error::LookupError;
use crate::http::{parse_endpoint, HttpClient};
use crate::types::{Coordinates, TemperatureScale, Weather, WeatherCondition};

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,is_day,weather_code,wind_speed_10m";

#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current conditions at `coordinates`, temperatures in `unit`.
    async fn current(
        &self,
        coordinates: &Coordinates,
        unit: TemperatureScale,
    ) -> Result<Weather, LookupError>;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: Option<String>,
    temperature_2m: f64,
    apparent_temperature: Option<f64>,
    relative_humidity_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
    weather_code: i32,
    is_day: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    http: HttpClient,
    endpoint: Url,
}

impl WeatherProvider {
    pub fn new(http: HttpClient, endpoint: &str) -> Result<Self, LookupError> {
        Ok(Self {
            http,
            endpoint: parse_endpoint(endpoint, "services.forecast_url")?,
        })
    }
}

fn parse_observed_at(raw: Option<&str>) -> chrono::DateTime<Utc> {
    raw.and_then(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M").ok())
        .map(|t| t.and_utc())
        .unwrap_or_else(Utc::now)
}

#[async_trait]
impl WeatherSource for WeatherProvider {
    async fn current(
        &self,
        coordinates: &Coordinates,
        unit: TemperatureScale,
    ) -> Result<Weather, LookupError> {
        let query = [
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("temperature_unit", unit.as_query().to_string()),
            ("timezone", "GMT".to_string()),
        ];

        let body: ForecastResponse = self.http.get_json(&self.endpoint, &query).await?;
        let current = body
            .current
            .ok_or_else(|| LookupError::Parse("forecast response carried no current block".into()))?;

        let weather = Weather {
            temperature: current.temperature_2m,
            feels_like: current.apparent_temperature.unwrap_or(current.temperature_2m),
            humidity: current
                .relative_humidity_2m
                .map(|h| h.clamp(0.0, 100.0).round() as u8)
                .unwrap_or_default(),
            wind_speed: current.wind_speed_10m.unwrap_or_default(),
            condition: WeatherCondition::from_wmo_code(current.weather_code),
            is_day: current.is_day.map_or(true, |d| d == 1),
            unit,
            observed_at: parse_observed_at(current.time.as_deref()),
        };

        tracing::info!(
            "Weather: {:.1}{} {}",
            weather.temperature,
            unit.symbol(),
            weather.condition.description()
        );
        Ok(weather)
    }
}
