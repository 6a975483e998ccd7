//! The user context store and its best-effort initialization sequence.
//!
//! Each lookup stage fails on its own: an error becomes an absent field, a
//! `warn!` line and a `StageFailure` entry, and never reaches the caller of
//! [`UserContextStore::initialize`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use folio_core::TemperatureUnit;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::error::LookupError;
use crate::geocode::{CitySearch, ReverseGeocoder};
use crate::language::LanguageDetector;
use crate::location::GeolocationSource;
use crate::provider::WeatherSource;
use crate::timezone::TimezoneResolver;
use crate::types::{
    City, CityCandidate, Coordinates, Language, Stage, StageFailure, TemperatureScale, Timezone,
    UserContext, Weather,
};

/// The collaborators the store draws on
#[derive(Clone)]
pub struct Lookups {
    pub geolocation: Arc<dyn GeolocationSource>,
    pub reverse_geocoder: Arc<dyn ReverseGeocoder>,
    pub city_search: Arc<dyn CitySearch>,
    pub timezone: Arc<dyn TimezoneResolver>,
    pub language: Arc<dyn LanguageDetector>,
    pub weather: Arc<dyn WeatherSource>,
}

/// Options for [`UserContextStore::initialize`]
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub enable_geolocation: bool,
    /// Upper bound for the geolocation stage only
    pub timeout: Duration,
    pub temperature_unit: TemperatureUnit,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            enable_geolocation: true,
            timeout: Duration::from_secs(5),
            temperature_unit: TemperatureUnit::Auto,
        }
    }
}

pub struct UserContextStore {
    state: watch::Sender<UserContext>,
    started: AtomicBool,
    failures: Mutex<Vec<StageFailure>>,
    lookups: Lookups,
}

impl UserContextStore {
    pub fn new(lookups: Lookups) -> Self {
        let (state, _) = watch::channel(UserContext::default());
        Self {
            state,
            started: AtomicBool::new(false),
            failures: Mutex::new(Vec::new()),
            lookups,
        }
    }

    /// Current state
    pub fn snapshot(&self) -> UserContext {
        self.state.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<UserContext> {
        self.state.subscribe()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().is_initialized
    }

    /// Stages that degraded during initialization
    pub fn failures(&self) -> Vec<StageFailure> {
        self.failures.lock().clone()
    }

    /// Run the initialization sequence once per store.
    ///
    /// Later calls, and calls after [`set_partial_initialization`](Self::set_partial_initialization),
    /// return without doing anything. Never fails: every stage error only
    /// leaves its field unset.
    pub async fn initialize(&self, options: InitOptions) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("User context already initialized or initializing");
            return;
        }

        tracing::info!(
            "Initializing user context (geolocation {})",
            if options.enable_geolocation { "enabled" } else { "disabled" }
        );
        self.state.send_modify(|ctx| ctx.is_loading = true);

        let language = self.detect_language().await;
        self.state.send_modify(|ctx| ctx.language = language.clone());

        if options.enable_geolocation {
            if let Some(coordinates) = self.locate(options.timeout).await {
                let unit = TemperatureScale::resolve(options.temperature_unit, language.as_ref());
                let (city, timezone, weather) = tokio::join!(
                    self.reverse_geocode(&coordinates),
                    self.resolve_timezone(&coordinates),
                    self.fetch_weather(&coordinates, unit),
                );
                self.state.send_modify(|ctx| {
                    ctx.city = city;
                    ctx.timezone = timezone;
                    ctx.weather = weather;
                });
            }
        } else {
            tracing::debug!("Geolocation disabled, skipping location lookups");
        }

        self.state.send_modify(|ctx| {
            ctx.is_loading = false;
            ctx.is_initialized = true;
        });

        let failures = self.failures.lock().len();
        if failures == 0 {
            tracing::info!("User context initialized");
        } else {
            tracing::info!("User context initialized with {} degraded stage(s)", failures);
        }
    }

    /// Mark the context initialized with nothing resolved, without any lookup.
    ///
    /// Used when the services are not configured. Has no effect once
    /// [`initialize`](Self::initialize) has started.
    pub fn set_partial_initialization(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("Initialization already started, ignoring partial initialization");
            return;
        }

        tracing::warn!("Lookups not configured, user context left empty");
        self.state.send_modify(|ctx| {
            *ctx = UserContext {
                is_initialized: true,
                is_loading: false,
                ..UserContext::default()
            };
        });
    }

    /// Search cities for a manual location choice.
    ///
    /// # Errors
    /// Unlike the initializer, search failures are returned to the caller.
    pub async fn search_cities(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CityCandidate>, LookupError> {
        self.lookups.city_search.search(query, limit).await
    }

    /// Override the detected location with a chosen city.
    ///
    /// City is always set; timezone and weather are refreshed on a best-effort
    /// basis. Their failures are logged but not added to [`failures`](Self::failures),
    /// which only describes the initialization sequence.
    pub async fn select_city(&self, candidate: &CityCandidate, temperature_unit: TemperatureUnit) {
        let language = self.state.borrow().language.clone();
        let unit = TemperatureScale::resolve(temperature_unit, language.as_ref());
        let coordinates = &candidate.coordinates;

        let timezone = match &candidate.timezone_name {
            Some(name) => Timezone::from_iana(name, Utc::now()),
            None => self.lookups.timezone.resolve(coordinates).await,
        };
        let timezone = degrade(Stage::Timezone, timezone);
        let weather = degrade(
            Stage::Weather,
            self.lookups.weather.current(coordinates, unit).await,
        );
        let city = candidate.to_city();

        tracing::info!("Location set to {}", city.label());
        self.state.send_modify(|ctx| {
            ctx.city = Some(city);
            ctx.timezone = timezone;
            ctx.weather = weather;
        });
    }

    async fn detect_language(&self) -> Option<Language> {
        let result = self.lookups.language.detect().await;
        self.settle(Stage::Language, result)
    }

    async fn locate(&self, timeout: Duration) -> Option<Coordinates> {
        tracing::debug!(
            "Locating via {} (timeout {:?})",
            self.lookups.geolocation.name(),
            timeout
        );
        let result = match tokio::time::timeout(timeout, self.lookups.geolocation.locate()).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout),
        };
        self.settle(Stage::Geolocation, result)
    }

    async fn reverse_geocode(&self, coordinates: &Coordinates) -> Option<City> {
        let result = self.lookups.reverse_geocoder.reverse(coordinates).await;
        self.settle(Stage::ReverseGeocoding, result)
    }

    async fn resolve_timezone(&self, coordinates: &Coordinates) -> Option<Timezone> {
        let result = self.lookups.timezone.resolve(coordinates).await;
        self.settle(Stage::Timezone, result)
    }

    async fn fetch_weather(&self, coordinates: &Coordinates, unit: TemperatureScale) -> Option<Weather> {
        let result = self.lookups.weather.current(coordinates, unit).await;
        self.settle(Stage::Weather, result)
    }

    /// Turn a stage result into a field value, recording the failure.
    fn settle<T>(&self, stage: Stage, result: Result<T, LookupError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("{} unavailable: {}", stage, e);
                self.failures.lock().push(StageFailure {
                    stage,
                    message: e.to_string(),
                });
                None
            }
        }
    }
}

/// Like `settle`, for lookups outside the initialization sequence
fn degrade<T>(stage: Stage, result: Result<T, LookupError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("{} unavailable: {}", stage, e);
            None
        }
    }
}
