//! Presentation helpers for emergency records.

use chrono::{DateTime, Locale, Utc};

pub use allerta_common::links::id_from_self;

const DISPLAY_FORMAT: &str = "%-d %B %Y, %H:%M";

/// Formats a timestamp as an Italian long date, e.g. `1 settembre 2021, 00:00`.
/// Times are shown in UTC.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format_localized(DISPLAY_FORMAT, Locale::it_IT)
        .to_string()
}
