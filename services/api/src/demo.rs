use crate::infra::{parse_instant, parse_preset};
use crate::report::render_report;
use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::Args;
use placement_analytics::error::AppError;
use placement_analytics::placements::{
    AnalyticsPolicy, DateRange, Granularity, PlacementAnalytics, PolicyPreset, ReportScope,
    ReportingCalendar,
};
use serde_json::{json, Value};

/// (city, state token, placements, spacing in days between them)
const DEMO_SITES: [(&str, &str, usize, i64); 14] = [
    ("Austin", "TX", 18, 6),
    ("Houston", "Texas", 12, 11),
    ("Dallas", "tx", 7, 19),
    ("Fresno", "CA", 10, 9),
    ("Sacramento", "California", 6, 23),
    ("Columbus", "OH", 8, 13),
    ("Cleveland", "ohio", 3, 41),
    ("Portland", "ME", 4, 37),
    ("Boise", "ID", 3, 71),
    ("Tampa", "FL", 9, 17),
    ("Raleigh", "North Carolina", 5, 29),
    ("Denver", "CO", 2, 120),
    ("Albany", "new-york", 4, 44),
    ("Washington", "DC", 2, 95),
];

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting instant (RFC 3339 or YYYY-MM-DD). Defaults to a fixed date
    /// so repeated runs print the same report.
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Dashboard policy preset
    #[arg(long, value_parser = parse_preset)]
    pub(crate) policy: Option<PolicyPreset>,
    /// Use weekly trend buckets
    #[arg(long)]
    pub(crate) weekly: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        now,
        policy,
        weekly,
    } = args;

    let now = now.unwrap_or_else(demo_now);
    let policy = AnalyticsPolicy::from_preset(policy.unwrap_or_default());
    let engine = PlacementAnalytics::new(policy, ReportingCalendar::utc());
    let items = synthetic_placements(now);

    println!("Placement analytics demo ({} synthetic records)\n", items.len());
    for range in [DateRange::Last90Days, DateRange::AllTime] {
        let scope = ReportScope {
            date_range: range,
            granularity: if weekly {
                Granularity::Weekly
            } else {
                Granularity::Daily
            },
            selected_state: None,
        };
        let report = engine.report(&items, &scope, now);
        render_report(&report);
        println!();
    }

    Ok(())
}

fn demo_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Deterministic placement feed in the loose shape the portal returns,
/// including the malformed rows real exports carry.
pub(crate) fn synthetic_placements(now: DateTime<Utc>) -> Vec<Value> {
    let mut items = Vec::new();
    let mut next_id = 1000;

    for (site_index, (city, state, count, spacing)) in DEMO_SITES.iter().enumerate() {
        for nth in 0..*count {
            let days_back = 1 + site_index as i64 + nth as i64 * spacing;
            let placed = now - Duration::days(days_back);
            let date = if nth % 2 == 0 {
                json!(placed.format("%Y-%m-%d").to_string())
            } else {
                json!(placed.timestamp_millis())
            };
            items.push(json!({
                "app_id": next_id,
                "city": city,
                "state": state,
                "placement_date": date,
            }));
            next_id += 1;
        }
    }

    items.push(json!({
        "appId": "legacy-7",
        "city": "Springfield",
        "state": "n/a",
        "placed_at": "2025-03-02",
    }));
    items.push(json!({
        "app_id": next_id,
        "city": "Reno",
        "state": "NV",
        "placement_date": "TBD",
    }));
    items.push(json!("not a record"));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement_analytics::placements::State;

    #[test]
    fn synthetic_feed_is_deterministic_and_exercises_degradations() {
        let now = demo_now();
        let first = synthetic_placements(now);
        assert_eq!(first, synthetic_placements(now));

        let engine = PlacementAnalytics::default();
        let report = engine.report(&first, &ReportScope::default(), now);
        let expected: usize = DEMO_SITES.iter().map(|site| site.2).sum::<usize>() + 2;
        assert_eq!(report.kpis.total_records, expected);
        assert_eq!(report.kpis.unknown_state_records, 1);
        assert_eq!(report.kpis.invalid_date_records, 1);
        assert_eq!(report.kpis.top_state, Some(State::Texas));
        assert!(report
            .untapped_states
            .iter()
            .any(|row| row.state == State::Wyoming));
    }
}
