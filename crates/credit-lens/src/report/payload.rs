//! Typed accessors over the loosely-typed bureau payload.
//!
//! Bureau responses arrive as nested JSON whose fields may be missing, null,
//! or of the wrong type. Every probe here returns an `Option` and never fails;
//! callers compose them instead of matching on `Value` at each call site.

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

pub(crate) const PROVIDER_VIEWS: &str = "providerViews";
pub(crate) const PROVIDER_CODE: &str = "providerCode";
pub(crate) const SUMMARY: &str = "summary";
pub(crate) const SUBJECT: &str = "subject";
pub(crate) const PERSONAL_INFO: &str = "personalInfo";
pub(crate) const CREDIT_SCORE: &str = "creditScore";

/// Follows `path` through nested objects. Explicit `null` counts as absent.
pub(crate) fn value_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }

    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

pub(crate) fn object_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Map<String, Value>> {
    value_at(value, path).and_then(Value::as_object)
}

pub(crate) fn array_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Vec<Value>> {
    value_at(value, path).and_then(Value::as_array)
}

/// Reads a number, accepting numeric strings such as `"1,250.00"` or `"$300"`.
pub(crate) fn number_at(value: &Value, path: &[&str]) -> Option<f64> {
    value_at(value, path).and_then(coerce_number)
}

pub(crate) fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    value_at(value, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

pub(crate) fn date_at(value: &Value, path: &[&str]) -> Option<NaiveDate> {
    str_at(value, path).and_then(parse_date)
}

/// The provider-view sequence of a report, if it is present and an array.
pub(crate) fn provider_views(report: &Value) -> Option<&Vec<Value>> {
    array_at(report, &[PROVIDER_VIEWS])
}

pub(crate) fn provider_code(view: &Value) -> Option<&str> {
    str_at(view, &[PROVIDER_CODE])
}

pub(crate) fn summary(view: &Value) -> Option<&Value> {
    value_at(view, &[SUMMARY]).filter(|summary| summary.is_object())
}

pub(crate) fn subject(view: &Value) -> Option<&Map<String, Value>> {
    object_at(view, &[SUMMARY, SUBJECT])
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            let cleaned: String = text
                .trim()
                .chars()
                .filter(|ch| !matches!(ch, '$' | ',' | '%'))
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };

    number.is_finite().then_some(number)
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%m/%d/%Y") {
        return Some(date);
    }

    // Bureaus frequently report open dates at month granularity.
    NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d").ok()
}
