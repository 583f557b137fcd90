mod concentration;
mod kpis;
mod pace;
mod recency;
mod regions;
mod seasonality;
mod stats;
mod totals;
mod trend;
pub mod views;

pub use pace::growth_percentage;
pub use recency::NO_DATED_PLACEMENT_DAYS;
pub use views::PlacementReport;

use super::calendar::ReportingCalendar;
use super::policy::AnalyticsPolicy;
use super::record::{normalize_records, PlacementRecord};
use super::scope::{filter_records, ReportScope};
use chrono::{DateTime, Utc};
use kpis::KpiInputs;

/// Stateless engine that turns placement records into the dashboard views.
///
/// Every call recomputes from scratch; the engine holds configuration only.
#[derive(Debug, Clone, Default)]
pub struct PlacementAnalytics {
    policy: AnalyticsPolicy,
    calendar: ReportingCalendar,
}

impl PlacementAnalytics {
    pub fn new(policy: AnalyticsPolicy, calendar: ReportingCalendar) -> Self {
        Self { policy, calendar }
    }

    pub fn policy(&self) -> &AnalyticsPolicy {
        &self.policy
    }

    pub fn calendar(&self) -> &ReportingCalendar {
        &self.calendar
    }

    /// Normalizes decoded upstream items and builds the full report.
    pub fn report(
        &self,
        items: &[serde_json::Value],
        scope: &ReportScope,
        now: DateTime<Utc>,
    ) -> PlacementReport {
        let records = normalize_records(items, &self.calendar);
        self.report_records(&records, scope, now)
    }

    pub fn report_records(
        &self,
        records: &[PlacementRecord],
        scope: &ReportScope,
        now: DateTime<Utc>,
    ) -> PlacementReport {
        let policy = &self.policy;
        let calendar = &self.calendar;
        let limits = &policy.top_n;

        let cutoff = scope.date_range.cutoff(now);
        let scoped = filter_records(records, scope.date_range, now);
        let location = totals::aggregate(&scoped);

        let trend_start = trend::span_start(cutoff, &scoped, calendar, now);
        let trend = trend::build_series(
            scoped.iter().copied().filter(|record| {
                scope
                    .selected_state
                    .map_or(true, |selected| record.state == selected)
            }),
            scope.granularity,
            trend_start,
            calendar.local_date(now),
            calendar,
        );

        let recency = recency::build_recency(records, policy, calendar, now);
        let regional = regions::build_regions(
            &location.state_counts,
            policy.include_unknown_states,
            limits.region_states,
        );
        let kpis = kpis::summarize(
            &KpiInputs {
                records,
                scoped: &scoped,
                state_totals: &location.state_totals,
                regional: &regional,
                recency: &recency,
                cutoff,
            },
            policy,
            calendar,
            now,
        );

        PlacementReport {
            generated_at: now,
            scope: scope.clone(),
            utc_offset_minutes: calendar.offset_minutes(),
            top_cities: totals::top_cities(&location.cities, limits.cities),
            city_drilldown: totals::city_drilldown(
                &location.cities,
                scope.selected_state,
                limits.drilldown_cities,
            ),
            trend,
            momentum: trend::build_momentum(records, policy, calendar, now),
            pace: pace::build_pace(records, policy, now),
            pareto: concentration::build_pareto(
                &location.state_totals,
                scoped.len(),
                policy.include_unknown_states,
                limits.pareto,
            ),
            seasonality: seasonality::build_seasonality(
                &scoped,
                &location.state_totals,
                policy.include_unknown_states,
                limits.seasonality_states,
                calendar,
                now,
            ),
            recency: recency.recency,
            stale_states: recency.stale_states,
            regions: regional.regions,
            untapped_states: regional.untapped_states,
            state_totals: location.state_totals,
            kpis,
        }
    }
}
