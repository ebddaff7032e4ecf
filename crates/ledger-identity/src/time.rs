//! Time utilities for the identity registry.
//!
//! Issuance timestamps are RFC 3339 strings in UTC with second precision.

use chrono::{DateTime, Months, SecondsFormat, Utc};

/// Return the issuance window starting now: `(issued_at, expires_at)`.
///
/// `expires_at` is `years` calendar years after `issued_at`.
pub fn issue_window(years: u32) -> (String, String) {
    issue_window_from(Utc::now(), years)
}

/// Return the issuance window starting at `start`.
///
/// A start date of Feb 29 expires on Feb 28 of a non-leap year.
pub fn issue_window_from(start: DateTime<Utc>, years: u32) -> (String, String) {
    let expires = start
        .checked_add_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (to_iso(start), to_iso(expires))
}

fn to_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
