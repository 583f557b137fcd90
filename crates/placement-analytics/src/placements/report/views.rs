use super::super::policy::RiskBand;
use super::super::scope::ReportScope;
use super::super::states::{Region, State};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTotalRow {
    pub state: State,
    pub region: Region,
    pub placements: usize,
    pub share: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_placement_timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityHotspotRow {
    pub city: String,
    pub state: State,
    pub region: Region,
    pub placements: usize,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// `YYYY-MM-DD` of the day, or of the Monday opening the week.
    pub period_key: String,
    /// Epoch milliseconds of the period's local midnight.
    pub period_start: i64,
    pub period_label: String,
    pub placements: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateMomentumSeries {
    pub state: State,
    pub total_placements: usize,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatePaceRow {
    pub state: State,
    pub recent_placements: usize,
    pub prior_placements: usize,
    pub growth_delta: i64,
    pub growth_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoRow {
    pub rank: usize,
    pub state: State,
    pub placements: usize,
    pub share: f64,
    pub cumulative_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalityMonth {
    pub month_index: usize,
    pub month_key: String,
    pub month_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalityCell {
    pub state: State,
    pub state_index: usize,
    pub month_label: String,
    pub month_index: usize,
    pub placements: usize,
    pub intensity: f64,
}

/// Dense state x month heatmap.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonalityGrid {
    pub states: Vec<State>,
    pub months: Vec<SeasonalityMonth>,
    pub cells: Vec<SeasonalityCell>,
    pub grid_max: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecencyRow {
    pub state: State,
    pub days_since_last_placement: i64,
    pub risk_band: RiskBand,
    pub risk_band_label: &'static str,
    pub total_placements: usize,
    pub last_placement_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaleStateRow {
    pub state: State,
    pub region: Region,
    pub days_since_last_placement: i64,
    pub total_placements: usize,
    pub last_placement_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStateEntry {
    pub state: State,
    pub placements: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCoverageRow {
    pub region: Region,
    pub total_placements: usize,
    pub share: f64,
    pub active_states: usize,
    pub states: Vec<RegionStateEntry>,
    pub truncated: bool,
    pub hidden_states: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UntappedStateRow {
    pub state: State,
    pub region: Region,
    pub placements: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSet {
    pub total_records: usize,
    pub scoped_placements: usize,
    pub active_states: usize,
    pub active_regions: usize,
    pub untapped_state_count: usize,
    pub top_state: Option<State>,
    pub top_state_share: f64,
    pub median_placements_per_state: f64,
    pub stale_state_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_placement_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_placement_label: Option<String>,
    pub avg_placements_per_day: f64,
    pub invalid_date_records: usize,
    pub unknown_state_records: usize,
}

/// Every derived view for one `(records, scope, policy, now)` invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementReport {
    pub generated_at: DateTime<Utc>,
    pub scope: ReportScope,
    pub utc_offset_minutes: i32,
    pub state_totals: Vec<StateTotalRow>,
    pub top_cities: Vec<CityHotspotRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub city_drilldown: Vec<CityHotspotRow>,
    pub trend: Vec<TrendPoint>,
    pub momentum: Vec<StateMomentumSeries>,
    pub pace: Vec<StatePaceRow>,
    pub pareto: Vec<ParetoRow>,
    pub seasonality: SeasonalityGrid,
    pub recency: Vec<RecencyRow>,
    pub stale_states: Vec<StaleStateRow>,
    pub regions: Vec<RegionCoverageRow>,
    pub untapped_states: Vec<UntappedStateRow>,
    pub kpis: KpiSet,
}
