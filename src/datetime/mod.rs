mod parser;

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate};
use combine::Parser;
use tracing::warn;

/// Parses a data and time string used in Internet Message Format based on what
/// specified in RFC 5322 section 3.3.
///
/// Different from `DateTime::parse_from_rfc2822`, this in addition allows some
/// patterns which are not supported by that function, specifically:
/// * using single digit for hour / minute / second,
/// * support comment,
/// * treating `-0000` as `+0000`, and
/// * the `JST` zone name some Japanese mailers still emit.
///
/// Note: to simplify the implementation, multi-line value handling defined in
/// IMF is ignored. Whitespace, tab, carriage return, and newline are handled
/// the same way. This function only accepts a complete datetime string.
pub fn parse_datetime(s: &[u8]) -> Option<DateTime<FixedOffset>> {
    match parser::date_time().parse(s) {
        Ok((dt, rest)) if rest.is_empty() => Some(dt),
        _ => None,
    }
}

/// Parses `M/D` (surrounding blanks allowed) into `(month, day)`.
///
/// The numbers are not range checked; that happens once a year is known.
pub fn parse_month_day(s: &str) -> Option<(u32, u32)> {
    match parser::month_day().parse(s.as_bytes()) {
        Ok((md, rest)) if rest.is_empty() => Some(md),
        _ => None,
    }
}

/// Picks the year a `month`/`day` report refers to and builds the date.
///
/// With a reference date (normally when the message was received) a January
/// report sent in December belongs to the next year and a December report
/// sent in January to the previous one. Without it the current local year is
/// used as is. An impossible date is logged and yields `None`.
pub fn resolve_report_date(month: u32, day: u32, reference: Option<NaiveDate>) -> Option<NaiveDate> {
    let year = match reference {
        Some(r) if r.month() == 12 && month == 1 => r.year() + 1,
        Some(r) if r.month() == 1 && month == 12 => r.year() - 1,
        Some(r) => r.year(),
        None => Local::now().year(),
    };
    let date = NaiveDate::from_ymd_opt(year, month, day);
    if date.is_none() {
        warn!("invalid report date {}/{}", month, day);
    }
    date
}
