//! Place names: coordinates to city (Nominatim) and free text to candidates (Open-Meteo).

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::LookupError;
use crate::http::{parse_endpoint, HttpClient};
use crate::types::{City, CityCandidate, Coordinates};

const MAX_SEARCH_RESULTS: usize = 10;

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Name the city at `coordinates`.
    async fn reverse(&self, coordinates: &Coordinates) -> Result<City, LookupError>;
}

#[async_trait]
pub trait CitySearch: Send + Sync {
    /// Find up to `limit` cities matching `query`.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CityCandidate>, LookupError>;
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state_district: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
}

impl NominatimAddress {
    fn into_city(self) -> Option<City> {
        let state = self.state.clone();
        let country = self.country.clone().unwrap_or_default();

        // city > town > village > municipality for the primary place name
        let name = self
            .city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
            .or(self.state_district)
            .or(self.county)
            .or(self.state)
            .or(self.country)
            .filter(|n| !n.is_empty())?;

        Some(City {
            region: state.filter(|s| !s.is_empty() && *s != name),
            country,
            country_code: self.country_code.map(|c| c.to_uppercase()),
            name,
        })
    }
}

/// Reverse geocoding via Nominatim (OpenStreetMap)
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: HttpClient,
    endpoint: Url,
}

impl NominatimGeocoder {
    pub fn new(http: HttpClient, endpoint: &str) -> Result<Self, LookupError> {
        Ok(Self {
            http,
            endpoint: parse_endpoint(endpoint, "services.reverse_geocode_url")?,
        })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, coordinates: &Coordinates) -> Result<City, LookupError> {
        let query = [
            ("lat", coordinates.latitude.to_string()),
            ("lon", coordinates.longitude.to_string()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
            ("layer", "address".to_string()),
            ("zoom", "10".to_string()),
        ];

        let body: NominatimResponse = self.http.get_json(&self.endpoint, &query).await?;

        let city = body
            .address
            .and_then(NominatimAddress::into_city)
            .ok_or_else(|| {
                LookupError::NotFound(format!(
                    "no place at {:.4}, {:.4}",
                    coordinates.latitude, coordinates.longitude
                ))
            })?;

        tracing::info!("Reverse geocoded to: {}", city.label());
        Ok(city)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    country_code: Option<String>,
    admin1: Option<String>,
    timezone: Option<String>,
}

impl From<SearchResult> for CityCandidate {
    fn from(r: SearchResult) -> Self {
        Self {
            coordinates: Coordinates::new(r.latitude, r.longitude),
            country: r.country.unwrap_or_default(),
            country_code: r.country_code.map(|c| c.to_uppercase()),
            region: r.admin1,
            timezone_name: r.timezone,
            name: r.name,
        }
    }
}

/// City search via the Open-Meteo geocoding API
#[derive(Debug, Clone)]
pub struct OpenMeteoCitySearch {
    http: HttpClient,
    endpoint: Url,
    language: String,
}

impl OpenMeteoCitySearch {
    pub fn new(http: HttpClient, endpoint: &str) -> Result<Self, LookupError> {
        Ok(Self {
            http,
            endpoint: parse_endpoint(endpoint, "services.city_search_url")?,
            language: "en".to_string(),
        })
    }

    /// Localize result names (ISO-639 code)
    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language = code.into();
        self
    }
}

#[async_trait]
impl CitySearch for OpenMeteoCitySearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CityCandidate>, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let limit = limit.clamp(1, MAX_SEARCH_RESULTS);

        let params = [
            ("name", query.to_string()),
            ("count", limit.to_string()),
            ("language", self.language.clone()),
            ("format", "json".to_string()),
        ];

        let body: SearchResponse = self.http.get_json(&self.endpoint, &params).await?;
        let candidates: Vec<CityCandidate> = body
            .results
            .into_iter()
            .take(limit)
            .map(CityCandidate::from)
            .collect();

        tracing::debug!("City search '{}' returned {} candidates", query, candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(json: serde_json::Value) -> NominatimAddress {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn prefers_city_over_town() {
        let city = address(serde_json::json!({
            "city": "Seattle",
            "town": "Ballard",
            "state": "Washington",
            "country": "United States",
            "country_code": "us"
        }))
        .into_city()
        .unwrap();

        assert_eq!(city.name, "Seattle");
        assert_eq!(city.region.as_deref(), Some("Washington"));
        assert_eq!(city.country, "United States");
        assert_eq!(city.country_code.as_deref(), Some("US"));
    }

    #[test]
    fn falls_back_to_village_then_county() {
        let village = address(serde_json::json!({ "village": "Hallstatt", "country": "Austria" }))
            .into_city()
            .unwrap();
        assert_eq!(village.name, "Hallstatt");

        let county = address(serde_json::json!({ "county": "Kerry", "country": "Ireland" }))
            .into_city()
            .unwrap();
        assert_eq!(county.name, "Kerry");
    }

    #[test]
    fn region_dropped_when_same_as_name() {
        let city = address(serde_json::json!({ "state": "Berlin", "country": "Germany" }))
            .into_city()
            .unwrap();
        assert_eq!(city.name, "Berlin");
        assert_eq!(city.region, None);
    }

    #[test]
    fn empty_address_is_not_a_city() {
        assert!(address(serde_json::json!({})).into_city().is_none());
    }

    #[test]
    fn search_result_becomes_candidate() {
        let result: SearchResult = serde_json::from_value(serde_json::json!({
            "id": 2267057,
            "name": "Lisbon",
            "latitude": 38.71667,
            "longitude": -9.13333,
            "country": "Portugal",
            "country_code": "PT",
            "admin1": "Lisbon",
            "timezone": "Europe/Lisbon"
        }))
        .unwrap();

        let candidate = CityCandidate::from(result);
        assert_eq!(candidate.name, "Lisbon");
        assert_eq!(candidate.timezone_name.as_deref(), Some("Europe/Lisbon"));
        assert_eq!(candidate.coordinates.latitude, 38.71667);
    }
}
