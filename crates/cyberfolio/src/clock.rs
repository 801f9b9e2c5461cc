//! Footer clock in a fixed time zone.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::config::UiConfig;

/// A fixed-offset wall clock, IST by default.
#[derive(Debug, Clone)]
pub struct Clock {
    offset: FixedOffset,
    label: String,
}

impl Clock {
    /// Create a clock `offset_minutes` east of UTC.
    ///
    /// Offsets outside +/-24h fall back to UTC.
    #[must_use]
    pub fn new(offset_minutes: i32, label: impl Into<String>) -> Self {
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self {
            offset,
            label: label.into(),
        }
    }

    /// Create the clock configured for the footer.
    #[must_use]
    pub fn from_config(config: &UiConfig) -> Self {
        Self::new(config.utc_offset_minutes, config.timezone_label.clone())
    }

    /// Convert an instant to local time.
    #[must_use]
    pub fn local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.offset)
    }

    /// `HH:MM:SS LABEL`, 24-hour.
    #[must_use]
    pub fn format_time(&self, at: DateTime<Utc>) -> String {
        format!("{} {}", self.local(at).format("%H:%M:%S"), self.label)
    }

    /// `DD/MM/YYYY`.
    #[must_use]
    pub fn format_date(&self, at: DateTime<Utc>) -> String {
        self.local(at).format("%d/%m/%Y").to_string()
    }

    /// Date and time together.
    #[must_use]
    pub fn format_date_time(&self, at: DateTime<Utc>) -> String {
        format!("{} {}", self.format_date(at), self.format_time(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 31, h, m, 5).unwrap()
    }

    #[test]
    fn test_ist_offset() {
        let clock = Clock::new(330, "IST");
        assert_eq!(clock.format_time(at(10, 0)), "15:30:05 IST");
    }

    #[test]
    fn test_date_rolls_over() {
        let clock = Clock::new(330, "IST");
        assert_eq!(clock.format_date(at(20, 0)), "01/01/2025");
        assert_eq!(clock.format_date_time(at(20, 0)), "01/01/2025 01:30:05 IST");
    }

    #[test]
    fn test_bad_offset_is_utc() {
        let clock = Clock::new(100_000, "UTC");
        assert_eq!(clock.format_time(at(10, 0)), "10:00:05 UTC");
    }

    #[test]
    fn test_from_config_defaults() {
        let clock = Clock::from_config(&UiConfig::default());
        assert_eq!(clock.format_time(at(0, 0)), "05:30:05 IST");
    }
}
