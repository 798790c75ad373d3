//! Internal helpers for input validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so every operation enforces the same rules.

use chrono::{Datelike, Months, NaiveDate};
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Trim a user-provided name and reject empty values.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Key used to compare names for uniqueness.
///
/// `"  Groceries "`, `"GROCERIES"` and `"Ｇroceries"` all collide.
pub(crate) fn name_key(value: &str) -> String {
    value.trim().nfkc().collect::<String>().to_lowercase()
}

/// Trim optional free text, mapping blank input to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// First day of the month `date` falls in.
pub(crate) fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Half-open range `[first day, first day of next month)` around `date`.
pub(crate) fn month_bounds(date: NaiveDate) -> ResultEngine<(NaiveDate, NaiveDate)> {
    let start = month_start(date);
    let end = start
        .checked_add_months(Months::new(1))
        .ok_or_else(|| EngineError::Validation(format!("date out of range: {date}")))?;
    Ok((start, end))
}

/// First day of the month before the one `date` falls in.
pub(crate) fn previous_month_start(date: NaiveDate) -> ResultEngine<NaiveDate> {
    month_start(date)
        .checked_sub_months(Months::new(1))
        .ok_or_else(|| EngineError::Validation(format!("date out of range: {date}")))
}

/// Parse a `YYYY-MM-DD` date coming from a form field.
pub(crate) fn parse_date(value: &str) -> ResultEngine<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::Validation(format!("invalid date: {value}")))
}
