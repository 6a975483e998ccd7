use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{AppError, ConfigError};

const CONFIG_DIR_NAME: &str = "folio";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a one-line summary of all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory the config file was loaded from
    #[serde(skip)]
    pub config_dir: PathBuf,

    /// Third-party lookup endpoints
    #[serde(default)]
    pub services: ServiceConfig,

    /// Geolocation behaviour
    #[serde(default)]
    pub geolocation: GeolocationConfig,

    /// Language detection
    #[serde(default)]
    pub locale: LocaleConfig,

    /// Weather settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Retry policy for HTTP lookups
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// User agent sent with every lookup. Nominatim rejects anonymous clients.
    pub user_agent: String,

    /// IP geolocation endpoint (ipapi.co compatible JSON)
    pub geolocation_url: String,

    /// Nominatim reverse geocoding endpoint
    pub reverse_geocode_url: String,

    /// Open-Meteo geocoding search endpoint
    pub city_search_url: String,

    /// Open-Meteo forecast endpoint, used for weather and timezone
    pub forecast_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl ServiceConfig {
    /// Check that the lookups can run: a real user agent and parseable endpoints.
    pub fn is_configured(&self) -> bool {
        let agent = self.user_agent.trim();
        if agent.is_empty() || agent.starts_with("YOUR_") {
            return false;
        }
        self.endpoints()
            .iter()
            .all(|(_, url)| matches!(Url::parse(url), Ok(u) if u.scheme() == "http" || u.scheme() == "https"))
    }

    fn endpoints(&self) -> [(&'static str, &str); 4] {
        [
            ("services.geolocation_url", self.geolocation_url.as_str()),
            ("services.reverse_geocode_url", self.reverse_geocode_url.as_str()),
            ("services.city_search_url", self.city_search_url.as_str()),
            ("services.forecast_url", self.forecast_url.as_str()),
        ]
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("folio/{}", env!("CARGO_PKG_VERSION")),
            geolocation_url: "https://ipapi.co/json/".to_string(),
            reverse_geocode_url: "https://nominatim.openstreetmap.org/reverse".to_string(),
            city_search_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// Attempt geolocation at all
    pub enabled: bool,

    /// Visitor consent to share their position. Without it lookups report permission denied.
    pub consent: bool,

    /// Upper bound for the geolocation stage in milliseconds
    pub timeout_ms: u64,

    /// Fixed position, used instead of IP geolocation when both are set
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeolocationConfig {
    /// Returns the configured fixed position, if both coordinates are present.
    pub fn fixed_position(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            consent: true,
            timeout_ms: 5000,
            latitude: None,
            longitude: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Preferred locale (e.g. "pt_BR.UTF-8"), overrides the environment
    pub preferred: Option<String>,
}

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Auto,
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub temperature_unit: TemperatureUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled per attempt
    pub initial_delay_ms: u64,
    /// Cap for the retry delay
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 200,
            max_delay_ms: 2000,
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if the file is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        if !path.exists() {
            let config = Self {
                config_dir,
                ..Self::default()
            };
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let mut config: Config =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.config_dir = config_dir;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    ///
    /// # Errors
    /// `ConfigError::Invalid` if validation finds critical errors, and the
    /// typed `ConfigError` behind any load failure.
    pub fn load_validated() -> Result<(Self, ValidationResult), AppError> {
        Self::load_validated_from(&Self::config_path().map_err(config_error)?)
    }

    /// [`load_validated`](Self::load_validated) against an explicit path
    pub fn load_validated_from(path: &Path) -> Result<(Self, ValidationResult), AppError> {
        let config = Self::load_from(path).map_err(config_error)?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        for (field, url) in self.services.endpoints() {
            Self::validate_url(url, field, &mut result);
        }

        let agent = self.services.user_agent.trim();
        if agent.is_empty() || agent.starts_with("YOUR_") {
            result.add_warning(
                "services.user_agent",
                "User agent not configured - location lookups will be skipped",
            );
        }

        if self.services.request_timeout_secs == 0 {
            result.add_error(
                "services.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.geolocation.timeout_ms == 0 {
            result.add_error(
                "geolocation.timeout_ms",
                "Geolocation timeout must be greater than 0",
            );
        } else if self.geolocation.timeout_ms > 60_000 {
            result.add_warning(
                "geolocation.timeout_ms",
                "Geolocation timeout is more than a minute",
            );
        }

        match (self.geolocation.latitude, self.geolocation.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    result.add_error("geolocation.latitude", "Latitude must be within -90..90");
                }
                if !(-180.0..=180.0).contains(&lon) {
                    result.add_error("geolocation.longitude", "Longitude must be within -180..180");
                }
            }
            (None, None) => {}
            _ => result.add_warning(
                "geolocation",
                "Only one of latitude/longitude is set - fixed position ignored",
            ),
        }

        if matches!(&self.locale.preferred, Some(p) if p.trim().is_empty()) {
            result.add_warning("locale.preferred", "Preferred locale is empty - using environment");
        }

        if self.retry.max_retries > 10 {
            result.add_warning("retry.max_retries", "More than 10 retries per lookup");
        }

        result
    }

    fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("no user configuration directory".into()))?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }
}

/// Surface typed config failures; anything else stays opaque
fn config_error(e: anyhow::Error) -> AppError {
    match e.downcast::<ConfigError>() {
        Ok(config) => AppError::Config(config),
        Err(other) => AppError::Other(other),
    }
}
