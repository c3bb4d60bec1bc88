use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads the calendar day out of the textual date forms the backend sends.
///
/// Time of day is dropped. Offset-carrying timestamps are moved to UTC first so
/// the day matches the `YYYY-MM-DD` key the backend itself would produce.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date_time) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(date_time.date());
    }
    if let Ok(date_time) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(date_time.date());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|date_time| date_time.with_timezone(&Utc).date_naive())
}

/// Day key used to match real payments against schedule slots
pub fn day_key(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Deserializes an optional day, turning anything unreadable into `None`.
pub fn lenient_day<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => parse_day(&raw),
        _ => None,
    })
}

/// Deserializes a mandatory day in any of the forms `parse_day` accepts.
pub fn strict_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).ok_or_else(|| serde::de::Error::custom(format!("Could not read date {}", raw)))
}
