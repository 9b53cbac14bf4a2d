//! Calendar date handling shared by the wire format and CLI input.
//!
//! Borrow records already in the store were written by screens that used
//! different date layouts, so reads accept all of them. Writes always use
//! `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate};

/// Canonical layout used when sending dates to the store.
///
/// Older web clients wrote `borrowDate`/`returnDate` as `MM/DD/YYYY`; records
/// in either layout are read back, but new ones are always ISO.
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

const US_DATE_FORMAT: &str = "%m/%d/%Y";

/// Parses `YYYY-MM-DD`, `MM/DD/YYYY`, or an RFC 3339 timestamp into a date.
///
/// Returns `None` for blank or unrecognized input.
#[must_use]
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(trimmed, WIRE_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, US_DATE_FORMAT))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}

/// Formats a date the way the store expects it.
#[must_use]
pub fn format_wire_date(date: NaiveDate) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}

/// Serde adapter: lenient on read, canonical on write.
pub(crate) mod lenient {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_wire_date(*date))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_flexible_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized date '{raw}'")))
    }
}
