use super::calendar::ReportingCalendar;
use super::states::State;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

const ID_FIELDS: [&str; 4] = ["app_id", "appId", "application_id", "id"];
const STATE_FIELDS: [&str; 3] = ["state", "state_name", "stateName"];
const DATE_FIELDS: [&str; 4] = ["placement_date", "placementDate", "placed_at", "date"];

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Years a placement date may fall in. Anything outside is treated as a
/// malformed date, which also keeps the daily trend span bounded.
const PLAUSIBLE_YEARS: RangeInclusive<i32> = 1900..=2199;

/// A placement event coerced from loosely-typed upstream data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementRecord {
    pub app_id: Option<String>,
    pub city: String,
    pub state: State,
    pub placement_date: Option<NaiveDate>,
    /// Epoch milliseconds; `0` when the date could not be parsed.
    pub placement_timestamp: i64,
    pub placement_date_raw: Option<String>,
}

impl PlacementRecord {
    pub fn is_dated(&self) -> bool {
        self.placement_date.is_some()
    }

    /// Timestamp of a dated record.
    pub fn dated_timestamp(&self) -> Option<i64> {
        self.placement_date.map(|_| self.placement_timestamp)
    }

    /// Builds a record from one decoded item. Returns `None` only when the
    /// item is not a JSON object; every malformed field degrades to its
    /// default instead.
    pub fn from_value(value: &Value, calendar: &ReportingCalendar) -> Option<Self> {
        let object = value.as_object()?;

        let app_id = first_field(object, &ID_FIELDS).and_then(scalar_text);
        let city = object
            .get("city")
            .and_then(Value::as_str)
            .map(normalize_city)
            .unwrap_or_default();
        let state = first_field(object, &STATE_FIELDS)
            .and_then(Value::as_str)
            .map_or(State::Unknown, State::canonicalize);

        let date_value = first_field(object, &DATE_FIELDS);
        let placement_date_raw = date_value.and_then(scalar_text);
        let instant = date_value.and_then(|value| parse_instant(value, calendar));

        Some(Self {
            app_id,
            city,
            state,
            placement_date: instant.map(|instant| calendar.local_date(instant)),
            placement_timestamp: instant.map_or(0, |instant| instant.timestamp_millis()),
            placement_date_raw,
        })
    }
}

/// Normalizes a batch of decoded items, silently dropping non-objects.
pub fn normalize_records(items: &[Value], calendar: &ReportingCalendar) -> Vec<PlacementRecord> {
    items
        .iter()
        .filter_map(|item| PlacementRecord::from_value(item, calendar))
        .collect()
}

fn first_field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn normalize_city(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Epoch `0` is the upstream placeholder for "no date", never a real one.
fn parse_instant(value: &Value, calendar: &ReportingCalendar) -> Option<DateTime<Utc>> {
    let instant = match value {
        Value::String(text) => parse_datetime(text, calendar),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|millis| millis.is_finite())
                    .map(|millis| millis.trunc() as i64)
            })
            .filter(|millis| *millis != 0)
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    }?;

    PLAUSIBLE_YEARS
        .contains(&calendar.local_date(instant).year())
        .then_some(instant)
}

/// Parses RFC 3339 instants, naive date-times (wall time in `calendar`), and
/// plain dates (local midnight in `calendar`).
pub(crate) fn parse_datetime(value: &str, calendar: &ReportingCalendar) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
    {
        return calendar.to_utc(naive);
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .and_then(|date| calendar.start_of_day(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc() -> ReportingCalendar {
        ReportingCalendar::utc()
    }

    #[test]
    fn drops_non_object_items() {
        let items = vec![
            json!(null),
            json!(42),
            json!("TX"),
            json!([1, 2]),
            json!({ "state": "TX" }),
        ];
        let records = normalize_records(&items, &utc());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].state, State::Texas);
    }

    #[test]
    fn extracts_fields_and_parses_dates() {
        let item = json!({
            "appId": 1042,
            "city": "  San   Antonio ",
            "state": "tx",
            "placement_date": "2026-09-30T15:45:00Z",
        });

        let record = PlacementRecord::from_value(&item, &utc()).expect("object");
        assert_eq!(record.app_id.as_deref(), Some("1042"));
        assert_eq!(record.city, "San Antonio");
        assert_eq!(record.state, State::Texas);
        assert_eq!(
            record.placement_date,
            NaiveDate::from_ymd_opt(2026, 9, 30)
        );
        assert_eq!(
            record.placement_timestamp,
            Utc.with_ymd_and_hms(2026, 9, 30, 15, 45, 0)
                .unwrap()
                .timestamp_millis()
        );
        assert_eq!(
            record.placement_date_raw.as_deref(),
            Some("2026-09-30T15:45:00Z")
        );
    }

    #[test]
    fn malformed_fields_degrade_to_defaults() {
        let item = json!({
            "city": 17,
            "state": { "code": "TX" },
            "date": "sometime next spring",
        });

        let record = PlacementRecord::from_value(&item, &utc()).expect("object");
        assert_eq!(record.app_id, None);
        assert_eq!(record.city, "");
        assert_eq!(record.state, State::Unknown);
        assert!(!record.is_dated());
        assert_eq!(record.placement_timestamp, 0);
        assert_eq!(
            record.placement_date_raw.as_deref(),
            Some("sometime next spring")
        );
    }

    #[test]
    fn plain_dates_resolve_to_calendar_midnight() {
        let eastern = ReportingCalendar::from_offset_minutes(-5 * 60).expect("offset");
        let parsed = parse_datetime("03/15/2026", &eastern).expect("us date");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 3, 15, 5, 0, 0).unwrap());

        let iso = parse_datetime("2026-03-15", &utc()).expect("iso date");
        assert_eq!(iso, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());

        let naive = parse_datetime("2026-03-15 08:30:00", &utc()).expect("naive");
        assert_eq!(naive, Utc.with_ymd_and_hms(2026, 3, 15, 8, 30, 0).unwrap());
    }

    #[test]
    fn epoch_millis_are_accepted() {
        let millis = Utc
            .with_ymd_and_hms(2026, 1, 2, 0, 0, 0)
            .unwrap()
            .timestamp_millis();
        let item = json!({ "state": "CA", "placementDate": millis });
        let record = PlacementRecord::from_value(&item, &utc()).expect("object");
        assert_eq!(record.placement_timestamp, millis);
        assert_eq!(record.placement_date, NaiveDate::from_ymd_opt(2026, 1, 2));
    }

    #[test]
    fn zero_and_implausible_dates_stay_undated() {
        let items = vec![
            json!({ "state": "OH", "placement_date": 0 }),
            json!({ "state": "TX", "placement_date": "0001-01-01" }),
            json!({ "state": "CA", "placement_date": "1850-06-01T00:00:00Z" }),
            json!({ "state": "NV", "placement_date": i64::MIN / 2 }),
            json!({ "state": "WA", "placement_date": "2500-01-01" }),
        ];
        let records = normalize_records(&items, &utc());
        assert_eq!(records.len(), 5);
        for record in &records {
            assert!(!record.is_dated(), "{:?} kept a date", record.state);
            assert_eq!(record.placement_timestamp, 0);
        }
        assert_eq!(records[0].placement_date_raw.as_deref(), Some("0"));
        assert_eq!(records[1].placement_date_raw.as_deref(), Some("0001-01-01"));

        let edge = PlacementRecord::from_value(
            &json!({ "state": "VT", "placement_date": "1900-01-01" }),
            &utc(),
        )
        .expect("object");
        assert_eq!(edge.placement_date, NaiveDate::from_ymd_opt(1900, 1, 1));
    }

    #[test]
    fn null_fields_fall_through_to_aliases() {
        let item = json!({ "placement_date": null, "date": "2026-05-01" });
        let record = PlacementRecord::from_value(&item, &utc()).expect("object");
        assert_eq!(record.placement_date, NaiveDate::from_ymd_opt(2026, 5, 1));
    }
}
