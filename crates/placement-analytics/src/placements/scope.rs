use super::calendar::DAY_MS;
use super::record::PlacementRecord;
use super::states::State;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Date window applied before aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateRange {
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "12m")]
    Last12Months,
    #[default]
    #[serde(rename = "all")]
    AllTime,
}

impl DateRange {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Last30Days,
            Self::Last90Days,
            Self::Last12Months,
            Self::AllTime,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::Last12Months => "12m",
            Self::AllTime => "all",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Last30Days => "Last 30 days",
            Self::Last90Days => "Last 90 days",
            Self::Last12Months => "Last 12 months",
            Self::AllTime => "All time",
        }
    }

    pub const fn lookback_days(self) -> Option<i64> {
        match self {
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
            Self::Last12Months => Some(365),
            Self::AllTime => None,
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|range| range.code().eq_ignore_ascii_case(trimmed))
    }

    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.lookback_days()
            .and_then(|days| now.checked_sub_signed(Duration::days(days)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
}

impl Granularity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Some(Self::Daily),
            "weekly" | "week" => Some(Self::Weekly),
            _ => None,
        }
    }
}

/// Caller-selected scope parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportScope {
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub granularity: Granularity,
    /// Drill filter for the city breakdown and the trend series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_state: Option<State>,
}

/// Restricts `records` to the requested window.
///
/// `AllTime` keeps every record, dated or not. Bounded ranges keep only dated
/// records at or after the cutoff.
pub fn filter_records(
    records: &[PlacementRecord],
    range: DateRange,
    now: DateTime<Utc>,
) -> Vec<&PlacementRecord> {
    match range.cutoff(now) {
        None if range == DateRange::AllTime => records.iter().collect(),
        cutoff => {
            let cutoff_ms = cutoff.map_or(i64::MIN, |instant| instant.timestamp_millis());
            records
                .iter()
                .filter(|record| {
                    record
                        .dated_timestamp()
                        .is_some_and(|timestamp| timestamp >= cutoff_ms)
                })
                .collect()
        }
    }
}

/// Whole days between `start` and `now`, never below one.
pub(crate) fn elapsed_days(start_ms: i64, now: DateTime<Utc>) -> i64 {
    (now.timestamp_millis().saturating_sub(start_ms) / DAY_MS).max(1)
}
