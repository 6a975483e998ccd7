//! Which decorative background to draw for the visitor's weather.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::greeting::local_hour;
use crate::types::{UserContext, WeatherCondition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sky {
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    Rain,
    Snow,
    Storm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    None,
    Light,
    Moderate,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherScene {
    pub sky: Sky,
    pub is_day: bool,
    pub intensity: Intensity,
}

impl WeatherScene {
    /// Pick a scene. Without weather the sky is clear; without `is_day` the
    /// visitor's local hour decides between day and night.
    pub fn from_context(ctx: &UserContext, now: DateTime<Utc>) -> Self {
        let (sky, intensity) = ctx
            .weather
            .as_ref()
            .map(|w| Self::classify(w.condition))
            .unwrap_or((Sky::Clear, Intensity::None));

        let is_day = match &ctx.weather {
            Some(w) => w.is_day,
            None => (6..18).contains(&local_hour(ctx, now)),
        };

        Self {
            sky,
            is_day,
            intensity,
        }
    }

    fn classify(condition: WeatherCondition) -> (Sky, Intensity) {
        match condition {
            WeatherCondition::Clear => (Sky::Clear, Intensity::None),
            WeatherCondition::PartlyCloudy => (Sky::PartlyCloudy, Intensity::None),
            WeatherCondition::Cloudy => (Sky::Overcast, Intensity::None),
            WeatherCondition::Fog => (Sky::Fog, Intensity::None),
            WeatherCondition::Drizzle => (Sky::Rain, Intensity::Light),
            WeatherCondition::Rain => (Sky::Rain, Intensity::Moderate),
            WeatherCondition::HeavyRain => (Sky::Rain, Intensity::Heavy),
            WeatherCondition::Sleet => (Sky::Snow, Intensity::Light),
            WeatherCondition::Snow => (Sky::Snow, Intensity::Moderate),
            WeatherCondition::Thunderstorm => (Sky::Storm, Intensity::Heavy),
        }
    }

    /// Stars only show through a mostly clear night sky
    pub fn shows_stars(&self) -> bool {
        !self.is_day && matches!(self.sky, Sky::Clear | Sky::PartlyCloudy)
    }

    pub fn shows_clouds(&self) -> bool {
        !matches!(self.sky, Sky::Clear)
    }

    /// Class name for the background element, e.g. `scene-rain-heavy-night`
    pub fn css_class(&self) -> String {
        let sky = match self.sky {
            Sky::Clear => "clear",
            Sky::PartlyCloudy => "partly-cloudy",
            Sky::Overcast => "overcast",
            Sky::Fog => "fog",
            Sky::Rain => "rain",
            Sky::Snow => "snow",
            Sky::Storm => "storm",
        };
        let intensity = match self.intensity {
            Intensity::None => "",
            Intensity::Light => "-light",
            Intensity::Moderate => "-moderate",
            Intensity::Heavy => "-heavy",
        };
        let time = if self.is_day { "day" } else { "night" };
        format!("scene-{sky}{intensity}-{time}")
    }
}
