//! Display helpers for record fields.

use chrono::NaiveDate;
use serde_json::Value;

/// Shown when a date is absent.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Shown when a date cannot be parsed.
pub const INVALID_DATE: &str = "Invalid date";

/// Format an ISO date or timestamp as `dd.mm.yyyy`.
///
/// Any time part (after `T` or a space) is ignored.
///
/// ```rust
/// use netbill_console::format::format_date;
///
/// assert_eq!(format_date(Some("2024-03-09T10:15:00Z")), "09.03.2024");
/// assert_eq!(format_date(None), "Not specified");
/// ```
#[must_use]
pub fn format_date(value: Option<&str>) -> String {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return NOT_SPECIFIED.to_string();
    };

    let date = raw.split(['T', ' ']).next().unwrap_or(raw);
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(date) => date.format("%d.%m.%Y").to_string(),
        Err(e) => {
            tracing::debug!(value = %raw, error = %e, "Invalid date");
            INVALID_DATE.to_string()
        }
    }
}

/// Like [`format_date`], but renders an absent date as `-`.
#[must_use]
pub fn format_date_optional(value: Option<&str>) -> String {
    match value.map(str::trim) {
        None | Some("") => "-".to_string(),
        Some(_) => format_date(value),
    }
}

/// Format a JSON date field; `null` counts as absent.
#[must_use]
pub fn format_date_value(value: &Value) -> String {
    match value {
        Value::Null => format_date_optional(None),
        Value::String(s) => format_date_optional(Some(s)),
        _ => INVALID_DATE.to_string(),
    }
}

/// Returns true if a field name looks like it holds a date.
#[must_use]
pub fn is_date_field(name: &str) -> bool {
    name.ends_with("_date") || name.ends_with("_at") || name == "date"
}
