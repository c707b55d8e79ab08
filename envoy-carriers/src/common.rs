//! Wire helpers shared by the carrier clients and parsers.
//!
//! Carrier APIs encode timestamps and booleans in their own ways and wrap
//! errors in different JSON envelopes.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use envoy_core::Carrier;
use envoy_fetch::{AccessToken, FetchError};
use reqwest::Response;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Longest error body excerpt carried into an error message.
const MAX_ERROR_LEN: usize = 200;

/// JSON pointers tried, in order, when looking for an error message.
const ERROR_POINTERS: &[&str] = &[
    "/errors/0/message",
    "/response/errors/0/message",
    "/error/message",
    "/error/errors/0/detail",
    "/error_description",
    "/error",
    "/message",
];

// ============================================================================
// Timestamps
// ============================================================================

/// Parses a carrier timestamp.
///
/// Tries RFC 3339 first, then a naive `YYYY-MM-DDTHH:MM:SS` (read as UTC),
/// then a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    parse_timestamp_in(raw, Utc.fix())
}

/// Parses a carrier timestamp, reading naive values in `offset`.
pub fn parse_timestamp_in(raw: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }

    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    offset.from_local_datetime(&naive).single()
}

/// Parses split `YYYYMMDD` and `HHMMSS` fields in the given offset.
///
/// A missing or blank time parses as midnight. A missing offset means UTC.
pub fn parse_compact(
    date: &str,
    time: Option<&str>,
    offset: Option<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    let date = date.trim();
    let naive = match time.map(str::trim).filter(|t| !t.is_empty()) {
        Some(time) => {
            NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S").ok()?
        }
        None => NaiveDate::parse_from_str(date, "%Y%m%d")
            .ok()?
            .and_hms_opt(0, 0, 0)?,
    };

    offset
        .unwrap_or_else(|| Utc.fix())
        .from_local_datetime(&naive)
        .single()
}

/// Parses a UTC offset such as `-05:00`, `+0530`, or `Z`.
pub fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") {
        return Some(Utc.fix());
    }

    let (sign, rest) = match raw.chars().next()? {
        '+' => (1, &raw[1..]),
        '-' => (-1, &raw[1..]),
        _ => (1, raw),
    };

    let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

// ============================================================================
// Serde Helpers
// ============================================================================

/// Deserializes a boolean sent either as a JSON bool or as a string.
///
/// Absent and `null` values read as `false`.
pub fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Ok(true),
            "false" | "no" | "n" | "0" | "" => Ok(false),
            other => Err(D::Error::custom(format!("invalid boolean string: {other}"))),
        },
        Some(other) => Err(D::Error::custom(format!("expected boolean, found {other}"))),
    }
}

/// Deserializes a seconds count sent either as a number or a decimal string.
pub fn seconds_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("seconds out of range: {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid seconds: {s}"))),
        other => Err(D::Error::custom(format!("expected seconds, found {other}"))),
    }
}

// ============================================================================
// Error Bodies
// ============================================================================

/// Extracts a human-readable message from an error response body.
///
/// Understands the JSON error envelopes the supported carriers use and falls
/// back to a truncated copy of the raw body.
pub fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let found = ERROR_POINTERS
            .iter()
            .filter_map(|pointer| value.pointer(pointer))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty());
        if let Some(message) = found {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    if trimmed.chars().count() > MAX_ERROR_LEN {
        let excerpt: String = trimmed.chars().take(MAX_ERROR_LEN).collect();
        format!("{excerpt}...")
    } else {
        trimmed.to_string()
    }
}

/// Reads a response body, turning non-success statuses into errors.
pub async fn read_body(carrier: Carrier, response: Response) -> Result<String, FetchError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(FetchError::Status {
            carrier,
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// Reclassifies an HTTP status error from a token endpoint as an auth error.
pub fn into_auth_error(err: FetchError) -> FetchError {
    match err {
        status @ FetchError::Status { .. } => FetchError::AuthenticationFailed(status.to_string()),
        other => other,
    }
}

// ============================================================================
// Headers
// ============================================================================

/// Builds JSON request headers carrying a bearer token.
pub fn bearer_headers(token: &AccessToken) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, header_value(&token.bearer_header())?);
    Ok(headers)
}

/// Converts a string into a header value.
pub fn header_value(value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value)
        .map_err(|e| FetchError::InvalidResponse(format!("Invalid header value: {e}")))
}

// ============================================================================
// Tests
// ============================================================================
