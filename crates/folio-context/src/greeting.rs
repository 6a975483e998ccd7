//! Personalized greeting shown on the home page.

use chrono::{DateTime, Timelike, Utc};

use crate::types::UserContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DayPart {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=21 => Self::Evening,
            _ => Self::Night,
        }
    }
}

/// Hour of day for the visitor, UTC when their timezone is unknown.
pub fn local_hour(ctx: &UserContext, now: DateTime<Utc>) -> u32 {
    match &ctx.timezone {
        Some(tz) => tz.local_time(now).hour(),
        None => now.hour(),
    }
}

// (language, morning, afternoon, evening, night, "from")
const PHRASES: [(&str, [&str; 4], &str); 5] = [
    ("en", ["Good morning", "Good afternoon", "Good evening", "Hello"], "from"),
    ("es", ["Buenos días", "Buenas tardes", "Buenas noches", "Buenas noches"], "desde"),
    ("pt", ["Bom dia", "Boa tarde", "Boa noite", "Boa noite"], "de"),
    ("fr", ["Bonjour", "Bon après-midi", "Bonsoir", "Bonsoir"], "depuis"),
    ("de", ["Guten Morgen", "Guten Tag", "Guten Abend", "Hallo"], "aus"),
];

/// "Good evening from Lisbon", in the visitor's language when supported.
pub fn compose(ctx: &UserContext, now: DateTime<Utc>) -> String {
    let code = ctx.language.as_ref().map(|l| l.code.as_str()).unwrap_or("en");
    let (_, phrases, from) = PHRASES
        .iter()
        .find(|(lang, _, _)| *lang == code)
        .unwrap_or(&PHRASES[0]);

    let index = match DayPart::from_hour(local_hour(ctx, now)) {
        DayPart::Morning => 0,
        DayPart::Afternoon => 1,
        DayPart::Evening => 2,
        DayPart::Night => 3,
    };
    let phrase = phrases[index];

    match &ctx.city {
        Some(city) => format!("{} {} {}", phrase, from, city.name),
        None => phrase.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{City, Language, Timezone};
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, hour, 0, 0).unwrap()
    }

    fn lisbon() -> City {
        City {
            name: "Lisbon".into(),
            country: "Portugal".into(),
            country_code: Some("PT".into()),
            region: None,
        }
    }

    #[test]
    fn day_parts() {
        assert_eq!(DayPart::from_hour(5), DayPart::Morning);
        assert_eq!(DayPart::from_hour(12), DayPart::Afternoon);
        assert_eq!(DayPart::from_hour(21), DayPart::Evening);
        assert_eq!(DayPart::from_hour(22), DayPart::Night);
        assert_eq!(DayPart::from_hour(3), DayPart::Night);
    }

    #[test]
    fn empty_context_greets_in_english_by_utc() {
        let ctx = UserContext::default();
        assert_eq!(compose(&ctx, at(9)), "Good morning");
    }

    #[test]
    fn uses_city_and_timezone() {
        let ctx = UserContext {
            city: Some(lisbon()),
            timezone: Some(Timezone {
                name: "Asia/Tokyo".into(),
                offset_minutes: 540,
            }),
            ..UserContext::default()
        };
        // 10:00 UTC is 19:00 in Tokyo
        assert_eq!(compose(&ctx, at(10)), "Good evening from Lisbon");
    }

    #[test]
    fn localizes_supported_languages() {
        let ctx = UserContext {
            city: Some(lisbon()),
            language: Some(Language {
                code: "pt".into(),
                region: Some("PT".into()),
            }),
            ..UserContext::default()
        };
        assert_eq!(compose(&ctx, at(14)), "Boa tarde de Lisbon");
    }

    #[test]
    fn unsupported_language_falls_back_to_english() {
        let ctx = UserContext {
            language: Some(Language {
                code: "ja".into(),
                region: None,
            }),
            ..UserContext::default()
        };
        assert_eq!(compose(&ctx, at(23)), "Hello");
    }
}
