use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// How a statement writes its transaction dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShape {
    /// `26/11/2025`
    DayMonthYear,
    /// `26 Nov`, year taken from the statement.
    DayMonthName,
}

// `%m/%d/%y` leads: chrono's `%Y` also accepts one- or two-digit years.
const FULL_DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%Y%m%d",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M"];

const YEARLESS_FORMATS: &[&str] = &["%d %b %Y", "%d %B %Y", "%b %d %Y", "%B %d %Y"];

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Canonical `YYYY-MM-DD` rendering.
pub fn format_canonical(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Normalize a statement date to `YYYY-MM-DD`.
///
/// Tries the shape's strict format first, then [`parse_loose`]. When both
/// fail the trimmed input comes back verbatim.
pub fn normalize(raw: &str, shape: DateShape, year: i32) -> String {
    let text = collapse_ws(raw);
    let strict = match shape {
        DateShape::DayMonthYear => NaiveDate::parse_from_str(&text, "%d/%m/%Y").ok(),
        DateShape::DayMonthName => {
            NaiveDate::parse_from_str(&format!("{text} {year}"), "%d %b %Y").ok()
        }
    };

    match strict.or_else(|| parse_loose(&text, year)) {
        Some(date) => format_canonical(date),
        None => {
            tracing::debug!(raw, "date left unparsed");
            text
        }
    }
}

/// Parse with an explicit strftime pattern, or with [`parse_loose`] when no
/// pattern is given. Returns the trimmed input verbatim on failure.
pub fn normalize_with_format(raw: &str, format: Option<&str>, year: i32) -> String {
    let text = raw.trim();
    let parsed = match format {
        Some(fmt) => NaiveDate::parse_from_str(text, fmt)
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(text, fmt).ok().map(|dt| dt.date())),
        None => parse_loose(text, year),
    };
    parsed
        .map(format_canonical)
        .unwrap_or_else(|| text.to_string())
}

/// Best-effort date parser for free-form input.
///
/// Ambiguous numeric dates are read month-first. Inputs without a year get
/// `default_year`.
pub fn parse_loose(raw: &str, default_year: i32) -> Option<NaiveDate> {
    let text = collapse_ws(raw);
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Some(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&text, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in FULL_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&text, fmt) {
            return Some(d);
        }
    }

    let with_year = format!("{text} {default_year}");
    YEARLESS_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&with_year, fmt).ok())
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
