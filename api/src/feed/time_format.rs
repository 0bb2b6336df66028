//! Relative-time formatting for idea cards

use chrono::{DateTime, Locale, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const WEEK: i64 = 604_800;

/// Formats absolute timestamps as short relative ages ("5 min ago").
/// Anything a week or older is shown as a calendar date in the configured
/// locale.
#[derive(Debug, Clone, Copy)]
pub struct RelativeTimeFormatter {
    locale: Locale,
}

impl Default for RelativeTimeFormatter {
    fn default() -> Self {
        Self::new(Locale::en_US)
    }
}

impl RelativeTimeFormatter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn format(&self, timestamp: Option<i64>, now: i64) -> String {
        let timestamp = match timestamp {
            Some(ts) if ts != 0 => ts,
            _ => return "just now".to_string(),
        };

        let elapsed = now.saturating_sub(timestamp).div_euclid(1000);

        if elapsed < MINUTE {
            "just now".to_string()
        } else if elapsed < HOUR {
            format!("{} min ago", elapsed / MINUTE)
        } else if elapsed < DAY {
            format!("{} h ago", elapsed / HOUR)
        } else if elapsed < WEEK {
            format!("{} d ago", elapsed / DAY)
        } else {
            match DateTime::<Utc>::from_timestamp_millis(timestamp) {
                Some(date) => date.format_localized("%-d %b", self.locale).to_string(),
                None => "just now".to_string(),
            }
        }
    }
}
