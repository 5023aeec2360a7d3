//! Unexcused absence ("alpha") classification.
//!
//! Everything here is a pure function of the status map passed in, so
//! callers recompute after every status refresh instead of caching results.

use chrono::NaiveDate;

use crate::models::{AttendanceStatus, StatusMap};

/// How a calendar day looks from the employee's attendance history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    /// Past day with no clock-in
    Alpha,
    /// Today, not clocked in yet
    NotYet,
    /// Clocked in, not clocked out
    Present,
    /// Clocked in and out
    Complete,
    Upcoming,
}

/// `date` is before `today` and has no record, or a record that never got
/// past `belum_masuk`. `status_map` must cover the month of `date`; a date
/// from a month that was never loaded has no entries and reads as alpha.
pub fn is_alpha(date: NaiveDate, today: NaiveDate, status_map: &StatusMap) -> bool {
    date < today
        && matches!(
            status_map.get(date),
            None | Some(AttendanceStatus::BelumMasuk)
        )
}

pub fn classify(date: NaiveDate, today: NaiveDate, status_map: &StatusMap) -> DayStatus {
    if is_alpha(date, today, status_map) {
        return DayStatus::Alpha;
    }

    match status_map.get(date) {
        Some(status) if status.is_complete() => DayStatus::Complete,
        Some(status) if status.is_open() => DayStatus::Present,
        None | Some(AttendanceStatus::BelumMasuk) if date == today => DayStatus::NotYet,
        _ => DayStatus::Upcoming,
    }
}

/// Alpha days in `from..=to`, oldest first
pub fn alpha_dates(
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
    status_map: &StatusMap,
) -> Vec<NaiveDate> {
    from.iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| is_alpha(*d, today, status_map))
        .collect()
}
