//! One page load: configuration in, a populated store out.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use folio_core::Config;

use crate::error::LookupError;
use crate::geocode::{CitySearch, NominatimGeocoder, OpenMeteoCitySearch, ReverseGeocoder};
use crate::http::HttpClient;
use crate::language::{parse_locale, LanguageDetector, LocaleLanguage};
use crate::location::{ConsentGate, FixedGeolocation, GeolocationSource, IpGeolocation};
use crate::provider::{WeatherProvider, WeatherSource};
use crate::store::{InitOptions, Lookups, UserContextStore};
use crate::timezone::{OpenMeteoTimezone, TimezoneResolver};
use crate::types::{City, CityCandidate, Coordinates, Language, TemperatureScale, Timezone, Weather};

pub struct PageSession {
    store: Arc<UserContextStore>,
    options: InitOptions,
    configured: bool,
}

impl PageSession {
    /// Build the collaborators described by `config`.
    ///
    /// Unusable service settings do not fail here; [`start`](Self::start)
    /// falls back to partial initialization instead.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn open(config: &Config) -> Result<Self, LookupError> {
        let configured = config.services.is_configured();
        let lookups = if configured {
            http_lookups(config)?
        } else {
            tracing::warn!("Service configuration incomplete, lookups disabled");
            Lookups::unconfigured()
        };

        let options = InitOptions {
            enable_geolocation: config.geolocation.enabled,
            timeout: Duration::from_millis(config.geolocation.timeout_ms),
            temperature_unit: config.weather.temperature_unit,
        };

        Ok(Self::with_lookups(lookups, options, configured))
    }

    pub fn with_lookups(lookups: Lookups, options: InitOptions, configured: bool) -> Self {
        Self {
            store: Arc::new(UserContextStore::new(lookups)),
            options,
            configured,
        }
    }

    pub fn store(&self) -> &Arc<UserContextStore> {
        &self.store
    }

    pub fn options(&self) -> &InitOptions {
        &self.options
    }

    /// Populate the store: the full sequence, or partial initialization when unconfigured.
    pub async fn start(&self) {
        if self.configured {
            self.store.initialize(self.options.clone()).await;
        } else {
            self.store.set_partial_initialization();
        }
    }

    pub fn close(self) {
        let failures = self.store.failures().len();
        tracing::info!("Closing page session ({} degraded stage(s))", failures);
    }
}

fn http_lookups(config: &Config) -> Result<Lookups, LookupError> {
    let services = &config.services;
    let http = HttpClient::from_config(services, &config.retry)?;

    let geolocation: Arc<dyn GeolocationSource> = match config.geolocation.fixed_position() {
        Some((latitude, longitude)) => Arc::new(FixedGeolocation::new(latitude, longitude)),
        None => Arc::new(ConsentGate::new(
            IpGeolocation::new(http.clone(), &services.geolocation_url)?,
            config.geolocation.consent,
        )),
    };

    let preferred = config.locale.preferred.clone();
    let mut city_search = OpenMeteoCitySearch::new(http.clone(), &services.city_search_url)?;
    if let Some(lang) = preferred.as_deref().and_then(parse_locale) {
        city_search = city_search.with_language(lang.code);
    }

    Ok(Lookups {
        geolocation,
        reverse_geocoder: Arc::new(NominatimGeocoder::new(
            http.clone(),
            &services.reverse_geocode_url,
        )?),
        city_search: Arc::new(city_search),
        timezone: Arc::new(OpenMeteoTimezone::new(http.clone(), &services.forecast_url)?),
        language: Arc::new(LocaleLanguage::new(preferred)),
        weather: Arc::new(WeatherProvider::new(http, &services.forecast_url)?),
    })
}

/// Stands in for every collaborator when the services are not configured.
struct Unconfigured;

impl Unconfigured {
    fn error() -> LookupError {
        LookupError::MissingConfiguration("services".to_string())
    }
}

#[async_trait]
impl GeolocationSource for Unconfigured {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn locate(&self) -> Result<Coordinates, LookupError> {
        Err(Self::error())
    }
}

#[async_trait]
impl ReverseGeocoder for Unconfigured {
    async fn reverse(&self, _coordinates: &Coordinates) -> Result<City, LookupError> {
        Err(Self::error())
    }
}

#[async_trait]
impl CitySearch for Unconfigured {
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<CityCandidate>, LookupError> {
        Err(Self::error())
    }
}

#[async_trait]
impl TimezoneResolver for Unconfigured {
    async fn resolve(&self, _coordinates: &Coordinates) -> Result<Timezone, LookupError> {
        Err(Self::error())
    }
}

#[async_trait]
impl LanguageDetector for Unconfigured {
    async fn detect(&self) -> Result<Language, LookupError> {
        Err(Self::error())
    }
}

#[async_trait]
impl WeatherSource for Unconfigured {
    async fn current(
        &self,
        _coordinates: &Coordinates,
        _unit: TemperatureScale,
    ) -> Result<Weather, LookupError> {
        Err(Self::error())
    }
}

impl Lookups {
    /// Collaborators that all report missing configuration
    pub fn unconfigured() -> Self {
        let stub = Arc::new(Unconfigured);
        Self {
            geolocation: stub.clone(),
            reverse_geocoder: stub.clone(),
            city_search: stub.clone(),
            timezone: stub.clone(),
            language: stub.clone(),
            weather: stub,
        }
    }
}
