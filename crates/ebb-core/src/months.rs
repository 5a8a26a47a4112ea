//! Whole-month distances between calendar dates
//!
//! All ages in ebb are measured in calendar months. Day-of-month never
//! matters: the 31st of January and the 1st of February are one month apart.

use chrono::{Datelike, NaiveDate};

/// Number of whole calendar months from `other` to `reference`
///
/// Computed as `(ref.year - other.year) * 12 + (ref.month - other.month)`.
/// The result is negative when `other` falls in a later month than
/// `reference`. Callers that index by age must clamp it themselves.
pub fn months_between(reference: NaiveDate, other: NaiveDate) -> i32 {
    (reference.year() - other.year()) * 12 + reference.month() as i32 - other.month() as i32
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month
    date.with_day(1).unwrap_or(date)
}
