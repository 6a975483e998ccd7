use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use folio_core::TemperatureUnit;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// A position on the globe, as reported by a geolocation source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: None,
        }
    }
}

/// The visitor's approximate city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
    pub country_code: Option<String>,
    pub region: Option<String>,
}

impl City {
    /// "Lisbon, Portugal", or just the name when the country is unknown.
    pub fn label(&self) -> String {
        if self.country.is_empty() || self.country == self.name {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// IANA timezone plus its UTC offset at the time it was resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timezone {
    pub name: String,
    pub offset_minutes: i32,
}

impl Timezone {
    /// Resolve an IANA zone name to its offset at `at`.
    pub fn from_iana(name: &str, at: DateTime<Utc>) -> Result<Self, LookupError> {
        let tz: Tz = name
            .parse()
            .map_err(|_| LookupError::Parse(format!("unknown timezone: {name}")))?;
        let offset = tz
            .offset_from_utc_datetime(&at.naive_utc())
            .fix()
            .local_minus_utc();

        Ok(Self {
            name: tz.name().to_string(),
            offset_minutes: offset / 60,
        })
    }

    /// Convert a UTC instant into this zone's wall clock.
    ///
    /// Offsets outside the valid range fall back to UTC.
    pub fn local_time(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(self.offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix());
        now.with_timezone(&offset)
    }
}

/// Primary language of the visitor, e.g. `en` with region `US`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub region: Option<String>,
}

impl Language {
    /// BCP-47 style tag: "en-US" or "en".
    pub fn tag(&self) -> String {
        match &self.region {
            Some(region) => format!("{}-{}", self.code, region),
            None => self.code.clone(),
        }
    }
}

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert WMO weather code to WeatherCondition
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::Sleet, // Freezing drizzle
            61 | 63 | 80 => Self::Rain,
            65 | 81 | 82 => Self::HeavyRain,
            66 | 67 => Self::Sleet, // Freezing rain
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Clear,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Cloudy => "cloud",
            Self::Fog => "cloud_fog",
            Self::Drizzle | Self::Rain | Self::HeavyRain => "cloud_rain",
            Self::Snow | Self::Sleet => "cloud_snow",
            Self::Thunderstorm => "cloud_lightning",
        }
    }
}

/// Unit a temperature was reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureScale {
    #[default]
    Celsius,
    Fahrenheit,
}

/// Regions that conventionally use Fahrenheit
const FAHRENHEIT_REGIONS: [&str; 3] = ["US", "LR", "MM"];

impl TemperatureScale {
    /// Resolve a configured preference; `auto` follows the visitor's language region.
    pub fn resolve(preference: TemperatureUnit, language: Option<&Language>) -> Self {
        match preference {
            TemperatureUnit::Celsius => Self::Celsius,
            TemperatureUnit::Fahrenheit => Self::Fahrenheit,
            TemperatureUnit::Auto => {
                let region = language.and_then(|l| l.region.as_deref());
                match region {
                    Some(r) if FAHRENHEIT_REGIONS.contains(&r) => Self::Fahrenheit,
                    _ => Self::Celsius,
                }
            }
        }
    }

    /// Query value understood by Open-Meteo's `temperature_unit`
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

/// Current conditions at the visitor's position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub condition: WeatherCondition,
    pub is_day: bool,
    pub unit: TemperatureScale,
    pub observed_at: DateTime<Utc>,
}

/// One result of a free-text city search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCandidate {
    pub name: String,
    pub country: String,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub coordinates: Coordinates,
    pub timezone_name: Option<String>,
}

impl CityCandidate {
    pub fn to_city(&self) -> City {
        City {
            name: self.name.clone(),
            country: self.country.clone(),
            country_code: self.country_code.clone(),
            region: self.region.clone(),
        }
    }
}

/// Everything known about the visitor.
///
/// Absent fields mean the lookup was unavailable, never that it is still running;
/// `is_loading` covers that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub city: Option<City>,
    pub timezone: Option<Timezone>,
    pub language: Option<Language>,
    pub weather: Option<Weather>,
    pub is_initialized: bool,
    pub is_loading: bool,
}

/// Steps of the initialization sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Geolocation,
    ReverseGeocoding,
    Timezone,
    Weather,
    Language,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Geolocation => "geolocation",
            Stage::ReverseGeocoding => "reverse geocoding",
            Stage::Timezone => "timezone",
            Stage::Weather => "weather",
            Stage::Language => "language",
        };
        f.write_str(name)
    }
}

/// A stage that degraded to "absent", kept for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}
