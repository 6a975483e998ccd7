//! In-process collaborators for exercising the initializer without a network.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

use folio_context::{
    City, CityCandidate, CitySearch, Coordinates, GeolocationSource, Language, LanguageDetector,
    LookupError, Lookups, ReverseGeocoder, TemperatureScale, Timezone, TimezoneResolver, Weather,
    WeatherCondition, WeatherSource,
};

#[derive(Debug, Clone, Copy)]
pub enum GeoOutcome {
    Found,
    Denied,
    Unavailable,
    Unsupported,
    /// Never answers
    Hang,
}

pub fn lisbon_coordinates() -> Coordinates {
    Coordinates::new(38.7167, -9.1333)
}

pub fn lisbon() -> City {
    City {
        name: "Lisbon".into(),
        country: "Portugal".into(),
        country_code: Some("PT".into()),
        region: None,
    }
}

pub fn lisbon_timezone() -> Timezone {
    Timezone {
        name: "Europe/Lisbon".into(),
        offset_minutes: 60,
    }
}

pub fn sunny(unit: TemperatureScale) -> Weather {
    Weather {
        temperature: 22.5,
        feels_like: 21.0,
        humidity: 40,
        wind_speed: 11.0,
        condition: WeatherCondition::Clear,
        is_day: true,
        unit,
        observed_at: Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap(),
    }
}

pub fn english_us() -> Language {
    Language {
        code: "en".into(),
        region: Some("US".into()),
    }
}

pub struct FakeGeolocation {
    pub outcome: GeoOutcome,
    pub calls: AtomicUsize,
}

#[async_trait]
impl GeolocationSource for FakeGeolocation {
    fn name(&self) -> &str {
        "fake"
    }

    async fn locate(&self) -> Result<Coordinates, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            GeoOutcome::Found => Ok(lisbon_coordinates()),
            GeoOutcome::Denied => Err(LookupError::PermissionDenied),
            GeoOutcome::Unavailable => Err(LookupError::PositionUnavailable("no fix".into())),
            GeoOutcome::Unsupported => Err(LookupError::Unsupported("no sensor".into())),
            GeoOutcome::Hang => std::future::pending().await,
        }
    }
}

pub struct FakeGeocoder {
    pub city: Option<City>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ReverseGeocoder for FakeGeocoder {
    async fn reverse(&self, _coordinates: &Coordinates) -> Result<City, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.city.clone().ok_or_else(|| LookupError::Api {
            status: 503,
            message: "geocoder down".into(),
        })
    }
}

pub struct FakeSearch {
    pub results: Vec<CityCandidate>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl CitySearch for FakeSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CityCandidate>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .results
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&query.to_lowercase()))
            .take(limit)
            .cloned()
            .collect())
    }
}

pub struct FakeTimezone {
    pub timezone: Option<Timezone>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl TimezoneResolver for FakeTimezone {
    async fn resolve(&self, _coordinates: &Coordinates) -> Result<Timezone, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.timezone
            .clone()
            .ok_or_else(|| LookupError::Parse("no timezone".into()))
    }
}

pub struct FakeLanguage {
    pub language: Option<Language>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl LanguageDetector for FakeLanguage {
    async fn detect(&self) -> Result<Language, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.language
            .clone()
            .ok_or_else(|| LookupError::Unsupported("no locale".into()))
    }
}

pub struct FakeWeather {
    pub available: bool,
    pub calls: AtomicUsize,
    pub last_unit: Mutex<Option<TemperatureScale>>,
}

#[async_trait]
impl WeatherSource for FakeWeather {
    async fn current(
        &self,
        _coordinates: &Coordinates,
        unit: TemperatureScale,
    ) -> Result<Weather, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_unit.lock() = Some(unit);
        if self.available {
            Ok(sunny(unit))
        } else {
            Err(LookupError::Timeout)
        }
    }
}

/// Every fake plus their call counters
pub struct Harness {
    pub geolocation: Arc<FakeGeolocation>,
    pub geocoder: Arc<FakeGeocoder>,
    pub search: Arc<FakeSearch>,
    pub timezone: Arc<FakeTimezone>,
    pub language: Arc<FakeLanguage>,
    pub weather: Arc<FakeWeather>,
}

impl Harness {
    /// All collaborators succeed
    pub fn healthy() -> Self {
        Self::with_geolocation(GeoOutcome::Found)
    }

    pub fn with_geolocation(outcome: GeoOutcome) -> Self {
        Self {
            geolocation: Arc::new(FakeGeolocation {
                outcome,
                calls: AtomicUsize::new(0),
            }),
            geocoder: Arc::new(FakeGeocoder {
                city: Some(lisbon()),
                calls: AtomicUsize::new(0),
            }),
            search: Arc::new(FakeSearch {
                results: vec![CityCandidate {
                    name: "Berlin".into(),
                    country: "Germany".into(),
                    country_code: Some("DE".into()),
                    region: Some("Land Berlin".into()),
                    coordinates: Coordinates::new(52.52, 13.41),
                    timezone_name: Some("Europe/Berlin".into()),
                }],
                calls: AtomicUsize::new(0),
            }),
            timezone: Arc::new(FakeTimezone {
                timezone: Some(lisbon_timezone()),
                calls: AtomicUsize::new(0),
            }),
            language: Arc::new(FakeLanguage {
                language: Some(english_us()),
                calls: AtomicUsize::new(0),
            }),
            weather: Arc::new(FakeWeather {
                available: true,
                calls: AtomicUsize::new(0),
                last_unit: Mutex::new(None),
            }),
        }
    }

    pub fn failing_geocoder(mut self) -> Self {
        self.geocoder = Arc::new(FakeGeocoder {
            city: None,
            calls: AtomicUsize::new(0),
        });
        self
    }

    pub fn failing_timezone(mut self) -> Self {
        self.timezone = Arc::new(FakeTimezone {
            timezone: None,
            calls: AtomicUsize::new(0),
        });
        self
    }

    pub fn failing_weather(mut self) -> Self {
        self.weather = Arc::new(FakeWeather {
            available: false,
            calls: AtomicUsize::new(0),
            last_unit: Mutex::new(None),
        });
        self
    }

    pub fn without_language(mut self) -> Self {
        self.language = Arc::new(FakeLanguage {
            language: None,
            calls: AtomicUsize::new(0),
        });
        self
    }

    pub fn lookups(&self) -> Lookups {
        Lookups {
            geolocation: self.geolocation.clone(),
            reverse_geocoder: self.geocoder.clone(),
            city_search: self.search.clone(),
            timezone: self.timezone.clone(),
            language: self.language.clone(),
            weather: self.weather.clone(),
        }
    }

    /// Calls that would have gone over the network
    pub fn network_calls(&self) -> usize {
        self.geolocation.calls.load(Ordering::SeqCst)
            + self.geocoder.calls.load(Ordering::SeqCst)
            + self.search.calls.load(Ordering::SeqCst)
            + self.timezone.calls.load(Ordering::SeqCst)
            + self.weather.calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.network_calls() + self.language.calls.load(Ordering::SeqCst)
    }
}
