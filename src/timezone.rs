//! Resolves the server's configured timezone to a calendar date.

use time::{Date, OffsetDateTime};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Get today's calendar date in the timezone named by `canonical_timezone`,
/// e.g. "Pacific/Auckland".
///
/// All users share this one notion of "today", there is no per-user timezone
/// handling.
///
/// # Errors
/// Returns an [Error::InvalidTimezone] if `canonical_timezone` is not a known
/// canonical timezone name.
pub fn local_date_today(canonical_timezone: &str) -> Result<Date, Error> {
    let timezone = time_tz::timezones::get_by_name(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))?;

    let now = OffsetDateTime::now_utc();
    let offset = timezone.get_offset_utc(&now).to_utc();

    Ok(now.to_offset(offset).date())
}

#[cfg(test)]
mod timezone_tests {
    use crate::Error;

    use super::local_date_today;

    #[test]
    fn utc_resolves_to_a_date() {
        assert!(local_date_today("UTC").is_ok());
    }

    #[test]
    fn named_timezone_resolves_to_a_date() {
        assert!(local_date_today("Pacific/Auckland").is_ok());
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let result = local_date_today("Atlantis/Central");

        assert_eq!(
            result,
            Err(Error::InvalidTimezone("Atlantis/Central".to_string()))
        );
    }
}
