use super::super::calendar::ReportingCalendar;
use super::super::policy::{AnalyticsPolicy, RiskBand, StaleStateMeasure};
use super::super::record::PlacementRecord;
use super::super::scope::elapsed_days;
use super::super::states::Region;
use super::recency::{format_placement_date, RecencyViews};
use super::regions::RegionalViews;
use super::stats::{median, round_to};
use super::views::{KpiSet, StateTotalRow};
use chrono::{DateTime, Utc};

/// Everything the headline cards read from.
pub(crate) struct KpiInputs<'a> {
    pub(crate) records: &'a [PlacementRecord],
    pub(crate) scoped: &'a [&'a PlacementRecord],
    pub(crate) state_totals: &'a [StateTotalRow],
    pub(crate) regional: &'a RegionalViews,
    pub(crate) recency: &'a RecencyViews,
    pub(crate) cutoff: Option<DateTime<Utc>>,
}

pub(crate) fn summarize(
    inputs: &KpiInputs<'_>,
    policy: &AnalyticsPolicy,
    calendar: &ReportingCalendar,
    now: DateTime<Utc>,
) -> KpiSet {
    let counted: Vec<usize> = inputs
        .state_totals
        .iter()
        .filter(|row| row.placements > 0)
        .filter(|row| policy.include_unknown_states || !row.state.is_unknown())
        .map(|row| row.placements)
        .collect();

    let top = inputs
        .state_totals
        .iter()
        .find(|row| !row.state.is_unknown());

    let stale_state_count = match policy.stale_measure {
        StaleStateMeasure::RiskLadder => inputs
            .recency
            .recency
            .iter()
            .filter(|row| row.risk_band == RiskBand::AtRisk)
            .count(),
        StaleStateMeasure::StaleThreshold => inputs.recency.stale_states.len(),
    };

    let latest = inputs
        .scoped
        .iter()
        .filter_map(|record| record.dated_timestamp())
        .max();
    let latest_placement_date =
        latest.and_then(|timestamp| calendar.local_date_from_millis(timestamp));
    let latest_placement_label = match latest_placement_date {
        Some(date) => Some(format_placement_date(date)),
        None => inputs
            .scoped
            .iter()
            .filter_map(|record| record.placement_date_raw.clone())
            .max(),
    };

    let span_start = inputs
        .cutoff
        .map(|cutoff| cutoff.timestamp_millis())
        .or_else(|| {
            inputs
                .scoped
                .iter()
                .filter_map(|record| record.dated_timestamp())
                .min()
        });
    let day_count = span_start.map_or(1, |start| elapsed_days(start, now));
    let scoped_placements = inputs.scoped.len();

    KpiSet {
        total_records: inputs.records.len(),
        scoped_placements,
        active_states: counted.len(),
        active_regions: inputs
            .regional
            .regions
            .iter()
            .filter(|row| row.region != Region::Unknown)
            .count(),
        untapped_state_count: inputs.regional.untapped_states.len(),
        top_state: top.map(|row| row.state),
        top_state_share: top.map_or(0.0, |row| row.share),
        median_placements_per_state: median(&counted),
        stale_state_count,
        latest_placement_date,
        latest_placement_label,
        avg_placements_per_day: round_to(scoped_placements as f64 / day_count as f64, 2),
        invalid_date_records: inputs
            .records
            .iter()
            .filter(|record| !record.is_dated())
            .count(),
        unknown_state_records: inputs
            .records
            .iter()
            .filter(|record| record.state.is_unknown())
            .count(),
    }
}
