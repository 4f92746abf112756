// Timestamp aliases and day conversions
//
// Apartment and review timestamps come from the block time (seconds),
// booking dates are chosen by the user and submitted in milliseconds.

use chrono::{DateTime, NaiveDate, Utc};

// Booking nights, milliseconds since the epoch
pub type TimestampMillis = u64;

// Block time, seconds since the epoch
pub type TimestampSeconds = u64;

// Midnight (UTC) of the given day, in milliseconds
// Days before the epoch are clamped to 0
pub fn day_to_millis(day: NaiveDate) -> TimestampMillis {
    let millis = day
        .and_hms_opt(0, 0, 0)
        .map(|datetime| datetime.and_utc().timestamp_millis())
        .unwrap_or(0);

    millis.max(0) as TimestampMillis
}

// Day (UTC) containing the given millisecond instant
pub fn millis_to_day(millis: TimestampMillis) -> Option<NaiveDate> {
    let millis = i64::try_from(millis).ok()?;
    DateTime::<Utc>::from_timestamp_millis(millis).map(|datetime| datetime.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_millis_round_trip() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let millis = day_to_millis(day);
        assert_eq!(millis, 1_709_251_200_000);
        assert_eq!(millis_to_day(millis), Some(day));
    }

    #[test]
    fn test_pre_epoch_day_is_clamped() {
        let day = NaiveDate::from_ymd_opt(1960, 1, 1).unwrap();
        assert_eq!(day_to_millis(day), 0);
    }
}
