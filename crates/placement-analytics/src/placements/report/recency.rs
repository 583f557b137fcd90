use super::super::calendar::{ReportingCalendar, DAY_MS};
use super::super::policy::{AnalyticsPolicy, RiskBand};
use super::super::record::PlacementRecord;
use super::super::states::State;
use super::views::{RecencyRow, StaleStateRow};
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Days reported for a state that has records but none with a usable date.
pub const NO_DATED_PLACEMENT_DAYS: i64 = 9_999;

pub(crate) const NO_DATED_PLACEMENT_LABEL: &str = "No dated placements";

#[derive(Debug, Default)]
struct StateActivity {
    total: usize,
    last_timestamp: Option<i64>,
    latest_raw: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct RecencyViews {
    pub(crate) recency: Vec<RecencyRow>,
    pub(crate) stale_states: Vec<StaleStateRow>,
}

/// Risk ladder and staleness list over every record. Range scope does not
/// apply: a state placed last year is stale no matter what the viewer picks.
pub(crate) fn build_recency(
    records: &[PlacementRecord],
    policy: &AnalyticsPolicy,
    calendar: &ReportingCalendar,
    now: DateTime<Utc>,
) -> RecencyViews {
    let mut activity: BTreeMap<State, StateActivity> = BTreeMap::new();
    for record in records {
        if record.state.is_unknown() && !policy.include_unknown_states {
            continue;
        }

        let entry = activity.entry(record.state).or_default();
        entry.total += 1;
        if let Some(timestamp) = record.dated_timestamp() {
            entry.last_timestamp =
                Some(entry.last_timestamp.map_or(timestamp, |last| last.max(timestamp)));
        }
        if let Some(raw) = &record.placement_date_raw {
            if entry.latest_raw.as_ref().map_or(true, |current| raw > current) {
                entry.latest_raw = Some(raw.clone());
            }
        }
    }

    let now_ms = now.timestamp_millis();
    let mut recency: Vec<(Staleness, RecencyRow)> = Vec::new();
    let mut stale_states: Vec<(Staleness, StaleStateRow)> = Vec::new();

    for (state, entry) in activity {
        let days = entry
            .last_timestamp
            .map_or(NO_DATED_PLACEMENT_DAYS, |last| days_between(last, now_ms));
        let risk_band = if entry.last_timestamp.is_none() {
            RiskBand::AtRisk
        } else {
            policy.risk_bands.classify(days)
        };
        let label = last_placement_label(
            entry
                .last_timestamp
                .and_then(|last| calendar.local_date_from_millis(last)),
            entry.latest_raw.as_deref(),
        );

        let staleness = Staleness {
            undated: entry.last_timestamp.is_none(),
            days,
            state,
        };

        if staleness.undated || days >= policy.stale_days_threshold {
            stale_states.push((staleness, StaleStateRow {
                state,
                region: state.region(),
                days_since_last_placement: days,
                total_placements: entry.total,
                last_placement_label: label.clone(),
            }));
        }

        recency.push((staleness, RecencyRow {
            state,
            days_since_last_placement: days,
            risk_band,
            risk_band_label: risk_band.label(),
            total_placements: entry.total,
            last_placement_label: label,
        }));
    }

    recency.sort_by(|(a, _), (b, _)| a.cmp(b));
    stale_states.sort_by(|(a, _), (b, _)| a.cmp(b));
    RecencyViews {
        recency: recency.into_iter().map(|(_, row)| row).collect(),
        stale_states: stale_states.into_iter().map(|(_, row)| row).collect(),
    }
}

/// Sort key putting the most stale state first: states with no dated
/// placement, then the longest gap, then the state name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Staleness {
    undated: bool,
    days: i64,
    state: State,
}

impl Ord for Staleness {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .undated
            .cmp(&self.undated)
            .then_with(|| other.days.cmp(&self.days))
            .then_with(|| self.state.cmp(&other.state))
    }
}

impl PartialOrd for Staleness {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Whole days from `last_ms` to `now_ms`; future placements count as today.
fn days_between(last_ms: i64, now_ms: i64) -> i64 {
    now_ms.saturating_sub(last_ms).div_euclid(DAY_MS).max(0)
}

pub(crate) fn format_placement_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub(crate) fn last_placement_label(date: Option<NaiveDate>, raw: Option<&str>) -> String {
    match (date, raw) {
        (Some(date), _) => format_placement_date(date),
        (None, Some(raw)) => raw.to_string(),
        (None, None) => NO_DATED_PLACEMENT_LABEL.to_string(),
    }
}
