use std::env;

use chrono::Locale;

use crate::app::{OverflowPolicy, SubmissionPolicy};

/// Which Record Store implementation backs the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local store, for development and tests
    Memory,
    /// Firebase Realtime Database over REST
    Firebase,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "firebase" => Ok(StoreBackend::Firebase),
            _ => Err(format!("Unknown store backend: {}", s)),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub store_backend: StoreBackend,
    /// Firebase database URL, e.g. https://<project>-default-rtdb.firebaseio.com
    pub firebase_url: Option<String>,
    /// Database secret or ID token appended as `?auth=`
    pub firebase_auth: Option<String>,
    /// Collection path the ideas live under
    pub ideas_path: String,
    pub submission: SubmissionPolicy,
    /// Locale for calendar dates in the relative-time formatter
    pub date_locale: Locale,
    /// Per-IP rate limiting on write routes
    pub rate_limit_enabled: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let store_backend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse::<StoreBackend>()
            .map_err(anyhow::Error::msg)?;

        let firebase_url = env::var("FIREBASE_DATABASE_URL").ok();
        if store_backend == StoreBackend::Firebase && firebase_url.is_none() {
            anyhow::bail!("FIREBASE_DATABASE_URL must be set when STORE_BACKEND=firebase");
        }

        let max_text_len = env::var("MAX_IDEA_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(SubmissionPolicy::DEFAULT_MAX_TEXT_LEN);

        let overflow = env::var("IDEA_OVERFLOW")
            .ok()
            .map(|v| v.parse::<OverflowPolicy>())
            .transpose()
            .map_err(anyhow::Error::msg)?
            .unwrap_or_default();

        let date_locale = env::var("DATE_LOCALE")
            .ok()
            .map(|v| parse_locale(&v))
            .transpose()
            .map_err(anyhow::Error::msg)?
            .unwrap_or(Locale::en_US);

        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            store_backend,
            firebase_url,
            firebase_auth: env::var("FIREBASE_AUTH").ok(),
            ideas_path: env::var("IDEAS_PATH").unwrap_or_else(|_| "ideas".to_string()),
            submission: SubmissionPolicy {
                max_text_len,
                overflow,
                ..SubmissionPolicy::default()
            },
            date_locale,
            rate_limit_enabled: env::var("RATE_LIMIT_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        })
    }
}

/// Map a POSIX-style locale name onto one of the supported date locales
pub fn parse_locale(name: &str) -> Result<Locale, String> {
    match name.trim().replace('-', "_").as_str() {
        "en_US" | "en" => Ok(Locale::en_US),
        "en_GB" => Ok(Locale::en_GB),
        "ru_RU" | "ru" => Ok(Locale::ru_RU),
        "uk_UA" | "uk" => Ok(Locale::uk_UA),
        "de_DE" | "de" => Ok(Locale::de_DE),
        "fr_FR" | "fr" => Ok(Locale::fr_FR),
        "es_ES" | "es" => Ok(Locale::es_ES),
        _ => Err(format!("Unsupported date locale: {}", name)),
    }
}
