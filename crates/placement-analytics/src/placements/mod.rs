//! Placement analytics: normalization, scoping, and the aggregation engine
//! behind the operations and manager dashboards.

pub mod calendar;
pub mod policy;
pub mod record;
pub mod report;
pub mod scope;
pub mod states;
mod tally;

pub use calendar::ReportingCalendar;
pub use policy::{AnalyticsPolicy, PolicyPreset, RiskBand, StaleStateMeasure};
pub use record::{normalize_records, PlacementRecord};
pub use report::{PlacementAnalytics, PlacementReport};
pub use scope::{filter_records, DateRange, Granularity, ReportScope};
pub use states::{Region, State};
