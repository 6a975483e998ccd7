//! Visitor context for the portfolio site.
//!
//! Detects the visitor's approximate city, timezone, language and current
//! weather on a best-effort basis and exposes them through a single
//! observable [`UserContextStore`].

pub mod error;
pub mod error_mapping;
pub mod geocode;
pub mod greeting;
pub mod http;
pub mod language;
pub mod location;
pub mod provider;
pub mod scene;
pub mod session;
pub mod store;
pub mod timezone;
pub mod types;

pub use error::LookupError;
pub use geocode::{CitySearch, NominatimGeocoder, OpenMeteoCitySearch, ReverseGeocoder};
pub use http::{HttpClient, RetryPolicy};
pub use language::{parse_locale, LanguageDetector, LocaleLanguage};
pub use location::{ConsentGate, FixedGeolocation, GeolocationSource, IpGeolocation};
pub use provider::{WeatherProvider, WeatherSource};
pub use scene::WeatherScene;
pub use session::PageSession;
pub use store::{InitOptions, Lookups, UserContextStore};
pub use timezone::{OpenMeteoTimezone, TimezoneResolver};
pub use types::*;
