//! Publication date display.
//!
//! Dates are shown as `dd MMM yyyy` with Brazilian Portuguese month
//! abbreviations (`15 mar 2021`), in the offset carried by the timestamp.
//! A missing or unparseable timestamp yields `None` and the page leaves the
//! date out.

use chrono::{DateTime, Datelike, FixedOffset};

const MONTHS_PT_BR: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Parse a CMS timestamp. Accepts Prismic's `+0000` offsets and RFC 3339.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

pub fn format_publication_date(raw: Option<&str>) -> Option<String> {
    let date = parse_timestamp(raw?)?;
    Some(format!(
        "{:02} {} {}",
        date.day(),
        MONTHS_PT_BR[date.month0() as usize],
        date.year()
    ))
}
