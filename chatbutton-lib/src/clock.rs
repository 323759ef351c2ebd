use chrono::{FixedOffset, Local, NaiveDateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("Unknown timezone '{0}'")]
    UnknownTimezone(String),
}

/// Source of the current wall-clock time in the site's timezone.
pub trait Clock {
    fn now(&self) -> Result<NaiveDateTime, ClockError>;
}

/// Reads the system clock and converts it to the configured timezone.
///
/// Accepts `local`, `UTC`, an IANA zone name such as `Europe/Prague` or a fixed offset such
/// as `+02:00`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    timezone: String,
}

impl SystemClock {
    pub fn new(timezone: impl Into<String>) -> Self {
        Self {
            timezone: timezone.into(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Result<NaiveDateTime, ClockError> {
        Ok(match resolve_timezone(&self.timezone)? {
            Timezone::Local => Local::now().naive_local(),
            Timezone::Named(tz) => Utc::now().with_timezone(&tz).naive_local(),
            Timezone::Fixed(offset) => Utc::now().with_timezone(&offset).naive_local(),
        })
    }
}

/// Always returns the same instant, or the same error.
#[derive(Debug, Clone)]
pub struct FixedClock(pub Result<NaiveDateTime, ClockError>);

impl Clock for FixedClock {
    fn now(&self) -> Result<NaiveDateTime, ClockError> {
        self.0.clone()
    }
}

enum Timezone {
    Local,
    Named(Tz),
    Fixed(FixedOffset),
}

fn resolve_timezone(name: &str) -> Result<Timezone, ClockError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("local") {
        return Ok(Timezone::Local);
    }
    if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
        return Ok(Timezone::Fixed(FixedOffset::east_opt(0).ok_or_else(
            || ClockError::UnknownTimezone(name.to_owned()),
        )?));
    }

    if let Ok(tz) = trimmed.parse::<Tz>() {
        return Ok(Timezone::Named(tz));
    }

    trimmed
        .parse::<FixedOffset>()
        .map(Timezone::Fixed)
        .map_err(|_| ClockError::UnknownTimezone(name.to_owned()))
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_resolve_timezone() {
        assert!(matches!(resolve_timezone("local"), Ok(Timezone::Local)));
        assert!(matches!(resolve_timezone(""), Ok(Timezone::Local)));
        assert!(matches!(
            resolve_timezone("UTC"),
            Ok(Timezone::Fixed(offset)) if offset.local_minus_utc() == 0
        ));
        assert!(matches!(
            resolve_timezone("+02:00"),
            Ok(Timezone::Fixed(offset)) if offset.local_minus_utc() == 7200
        ));
        assert!(matches!(
            resolve_timezone("-05:30"),
            Ok(Timezone::Fixed(offset)) if offset.local_minus_utc() == -19800
        ));
    }

    #[test]
    fn test_resolve_named_timezone() {
        assert!(matches!(
            resolve_timezone("Europe/Prague"),
            Ok(Timezone::Named(Tz::Europe__Prague))
        ));
        assert!(SystemClock::new("America/New_York").now().is_ok());
    }

    #[test]
    fn test_named_timezone_follows_daylight_saving() {
        let winter = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();
        let summer = NaiveDate::from_ymd_opt(2024, 7, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();

        assert_eq!(
            winter.with_timezone(&Tz::Europe__Prague).format("%H:%M").to_string(),
            "13:00"
        );
        assert_eq!(
            summer.with_timezone(&Tz::Europe__Prague).format("%H:%M").to_string(),
            "14:00"
        );
    }

    #[test]
    fn test_unknown_timezone() {
        assert_eq!(
            SystemClock::new("Mars/Olympus_Mons").now(),
            Err(ClockError::UnknownTimezone("Mars/Olympus_Mons".into()))
        );
    }

    #[test]
    fn test_fixed_clock() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        assert_eq!(FixedClock(Ok(at)).now(), Ok(at));
    }
}
