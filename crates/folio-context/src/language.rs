//! Language detection from the configured preference or the process locale.

use async_trait::async_trait;

use crate::error::LookupError;
use crate::types::Language;

/// Locale variables in precedence order
const LOCALE_VARS: [&str; 4] = ["LANGUAGE", "LC_ALL", "LC_MESSAGES", "LANG"];

#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self) -> Result<Language, LookupError>;
}

/// Parse a POSIX or BCP-47 locale string.
///
/// Accepts `en_US.UTF-8`, `en-US`, `pt_BR@euro` and `de`. `C`, `POSIX` and
/// malformed values yield `None`.
pub fn parse_locale(raw: &str) -> Option<Language> {
    let base = raw
        .trim()
        .split(['.', '@'])
        .next()
        .unwrap_or_default();

    if base.is_empty() || base.eq_ignore_ascii_case("c") || base.eq_ignore_ascii_case("posix") {
        return None;
    }

    let mut parts = base.split(['_', '-']);
    let code = parts.next()?;
    if !(2..=3).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let region = parts.next().filter(|r| {
        (r.len() == 2 && r.chars().all(|c| c.is_ascii_alphabetic()))
            || (r.len() == 3 && r.chars().all(|c| c.is_ascii_digit()))
    });

    Some(Language {
        code: code.to_ascii_lowercase(),
        region: region.map(str::to_ascii_uppercase),
    })
}

/// Reads the configured preference, then the locale environment.
#[derive(Debug, Clone, Default)]
pub struct LocaleLanguage {
    preferred: Option<String>,
    environment: Option<Vec<String>>,
}

impl LocaleLanguage {
    pub fn new(preferred: Option<String>) -> Self {
        Self {
            preferred,
            environment: None,
        }
    }

    /// Use these values instead of reading the process environment.
    pub fn with_environment(mut self, values: Vec<String>) -> Self {
        self.environment = Some(values);
        self
    }

    fn candidates(&self) -> Vec<String> {
        let mut out: Vec<String> = self.preferred.iter().cloned().collect();

        match &self.environment {
            Some(values) => out.extend(values.iter().cloned()),
            None => {
                for var in LOCALE_VARS {
                    if let Ok(value) = std::env::var(var) {
                        // LANGUAGE is a colon separated priority list
                        out.extend(value.split(':').map(str::to_string));
                    }
                }
            }
        }

        out
    }
}

#[async_trait]
impl LanguageDetector for LocaleLanguage {
    async fn detect(&self) -> Result<Language, LookupError> {
        self.candidates()
            .iter()
            .find_map(|c| parse_locale(c))
            .ok_or_else(|| LookupError::Unsupported("no usable locale".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_posix_locale() {
        let lang = parse_locale("en_US.UTF-8").unwrap();
        assert_eq!(lang.code, "en");
        assert_eq!(lang.region.as_deref(), Some("US"));
    }

    #[test]
    fn parses_bcp47_and_modifiers() {
        assert_eq!(parse_locale("pt-br").unwrap().tag(), "pt-BR");
        assert_eq!(parse_locale("de_DE@euro").unwrap().tag(), "de-DE");
        assert_eq!(parse_locale("es-419").unwrap().tag(), "es-419");
        assert_eq!(parse_locale("fr").unwrap().tag(), "fr");
    }

    #[test]
    fn rejects_c_and_garbage() {
        assert!(parse_locale("C").is_none());
        assert!(parse_locale("C.UTF-8").is_none());
        assert!(parse_locale("POSIX").is_none());
        assert!(parse_locale("").is_none());
        assert!(parse_locale("english").is_none());
    }

    #[tokio::test]
    async fn preference_wins_over_environment() {
        let detector = LocaleLanguage::new(Some("fr_CA".into()))
            .with_environment(vec!["en_US.UTF-8".into()]);
        assert_eq!(detector.detect().await.unwrap().tag(), "fr-CA");
    }

    #[tokio::test]
    async fn skips_unusable_values() {
        let detector = LocaleLanguage::new(Some("".into()))
            .with_environment(vec!["C".into(), "nl_NL.UTF-8".into()]);
        assert_eq!(detector.detect().await.unwrap().code, "nl");
    }

    #[tokio::test]
    async fn no_locale_is_unsupported() {
        let detector = LocaleLanguage::new(None).with_environment(vec!["POSIX".into()]);
        assert!(matches!(
            detector.detect().await.unwrap_err(),
            LookupError::Unsupported(_)
        ));
    }
}
