use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use placement_analytics::placements::{
    DateRange, Granularity, PlacementAnalytics, PolicyPreset, State,
};
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    /// Engine built from the configured policy and reporting calendar.
    pub(crate) analytics: Arc<PlacementAnalytics>,
}

pub(crate) fn parse_range(raw: &str) -> Result<DateRange, String> {
    DateRange::from_code(raw)
        .ok_or_else(|| format!("unknown range '{raw}' (expected 30d, 90d, 12m, or all)"))
}

pub(crate) fn parse_granularity(raw: &str) -> Result<Granularity, String> {
    Granularity::from_code(raw)
        .ok_or_else(|| format!("unknown granularity '{raw}' (expected daily or weekly)"))
}

pub(crate) fn parse_state(raw: &str) -> Result<State, String> {
    match State::canonicalize(raw) {
        State::Unknown => Err(format!("'{raw}' is not a U.S. state or abbreviation")),
        state => Ok(state),
    }
}

pub(crate) fn parse_preset(raw: &str) -> Result<PolicyPreset, String> {
    PolicyPreset::from_code(raw)
        .ok_or_else(|| format!("unknown policy '{raw}' (expected operations or manager)"))
}

/// Accepts an RFC 3339 instant or a bare `YYYY-MM-DD`, read as UTC midnight.
pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|err| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_instant<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_instant(&value).map_err(serde::de::Error::custom))
        .transpose()
}
