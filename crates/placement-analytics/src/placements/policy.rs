use serde::{Deserialize, Serialize};

/// Reporting policy shared by both dashboards. Each dashboard is a preset of
/// this record rather than its own pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsPolicy {
    pub risk_bands: RiskBandThresholds,
    /// States at or beyond this many days since their last placement are
    /// listed as stale.
    pub stale_days_threshold: i64,
    pub stale_measure: StaleStateMeasure,
    /// Whether `Unknown` counts toward active states, rankings, and regions.
    /// Raw state totals always keep it.
    pub include_unknown_states: bool,
    pub top_n: TopNLimits,
}

impl Default for AnalyticsPolicy {
    fn default() -> Self {
        Self::operations()
    }
}

impl AnalyticsPolicy {
    /// General operations dashboard: risk ladder, unknown states included.
    pub fn operations() -> Self {
        Self {
            risk_bands: RiskBandThresholds::default(),
            stale_days_threshold: 90,
            stale_measure: StaleStateMeasure::RiskLadder,
            include_unknown_states: true,
            top_n: TopNLimits::default(),
        }
    }

    /// Manager rollup: 90-day staleness list, unknown states excluded.
    pub fn manager_rollup() -> Self {
        Self {
            stale_measure: StaleStateMeasure::StaleThreshold,
            include_unknown_states: false,
            ..Self::operations()
        }
    }

    pub fn from_preset(preset: PolicyPreset) -> Self {
        match preset {
            PolicyPreset::Operations => Self::operations(),
            PolicyPreset::Manager => Self::manager_rollup(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyPreset {
    #[default]
    Operations,
    Manager,
}

impl PolicyPreset {
    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "operations" | "ops" | "general" => Some(Self::Operations),
            "manager" | "manager_rollup" => Some(Self::Manager),
            _ => None,
        }
    }
}

/// Which list feeds the `stale_state_count` KPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleStateMeasure {
    RiskLadder,
    StaleThreshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskBandThresholds {
    pub healthy_max_days: i64,
    pub watch_max_days: i64,
}

impl Default for RiskBandThresholds {
    fn default() -> Self {
        Self {
            healthy_max_days: 14,
            watch_max_days: 30,
        }
    }
}

impl RiskBandThresholds {
    pub fn classify(&self, days_since_last_placement: i64) -> RiskBand {
        if days_since_last_placement <= self.healthy_max_days {
            RiskBand::Healthy
        } else if days_since_last_placement <= self.watch_max_days {
            RiskBand::Watch
        } else {
            RiskBand::AtRisk
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Healthy,
    Watch,
    AtRisk,
}

impl RiskBand {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Watch => "Watch",
            Self::AtRisk => "At Risk",
        }
    }
}

/// Row caps for the ranked views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopNLimits {
    pub pareto: usize,
    pub seasonality_states: usize,
    pub momentum_states: usize,
    pub momentum_weeks: usize,
    pub region_states: usize,
    pub cities: usize,
    pub drilldown_cities: usize,
}

impl Default for TopNLimits {
    fn default() -> Self {
        Self {
            pareto: 12,
            seasonality_states: 15,
            momentum_states: 5,
            momentum_weeks: 16,
            region_states: 12,
            cities: 10,
            drilldown_cities: 25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_ladder_bands_are_inclusive() {
        let bands = RiskBandThresholds::default();
        assert_eq!(bands.classify(0), RiskBand::Healthy);
        assert_eq!(bands.classify(14), RiskBand::Healthy);
        assert_eq!(bands.classify(15), RiskBand::Watch);
        assert_eq!(bands.classify(30), RiskBand::Watch);
        assert_eq!(bands.classify(31), RiskBand::AtRisk);
    }

    #[test]
    fn presets_differ_only_in_dashboard_rules() {
        let operations = AnalyticsPolicy::operations();
        let manager = AnalyticsPolicy::manager_rollup();
        assert!(operations.include_unknown_states);
        assert!(!manager.include_unknown_states);
        assert_eq!(manager.stale_measure, StaleStateMeasure::StaleThreshold);
        assert_eq!(operations.top_n, manager.top_n);
        assert_eq!(operations.stale_days_threshold, 90);
    }

    #[test]
    fn partial_policy_documents_fill_defaults() {
        let policy: AnalyticsPolicy = serde_json::from_str(
            r#"{ "stale_days_threshold": 60, "risk_bands": { "watch_max_days": 45 } }"#,
        )
        .expect("policy parses");

        assert_eq!(policy.stale_days_threshold, 60);
        assert_eq!(policy.risk_bands.healthy_max_days, 14);
        assert_eq!(policy.risk_bands.watch_max_days, 45);
        assert_eq!(policy.top_n.pareto, 12);
    }
}
