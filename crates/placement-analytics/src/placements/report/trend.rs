use super::super::calendar::ReportingCalendar;
use super::super::policy::AnalyticsPolicy;
use super::super::record::PlacementRecord;
use super::super::scope::Granularity;
use super::super::tally::Tally;
use super::views::{StateMomentumSeries, TrendPoint};
use chrono::{DateTime, Duration, NaiveDate, Utc};

const FALLBACK_SPAN_DAYS: i64 = 30;

/// First local day of the trend span: the range cutoff, else the earliest
/// dated record, else thirty days back.
pub(crate) fn span_start(
    cutoff: Option<DateTime<Utc>>,
    scoped: &[&PlacementRecord],
    calendar: &ReportingCalendar,
    now: DateTime<Utc>,
) -> NaiveDate {
    if let Some(cutoff) = cutoff {
        return calendar.local_date(cutoff);
    }

    scoped
        .iter()
        .filter_map(|record| record.dated_timestamp())
        .min()
        .and_then(|earliest| calendar.local_date_from_millis(earliest))
        .unwrap_or_else(|| {
            let fallback = now
                .checked_sub_signed(Duration::days(FALLBACK_SPAN_DAYS))
                .unwrap_or(now);
            calendar.local_date(fallback)
        })
}

/// Gap-filled series from `start` through `end`, both local days. Weekly
/// buckets are keyed by the Monday that opens them.
pub(crate) fn build_series<'a, I>(
    records: I,
    granularity: Granularity,
    start: NaiveDate,
    end: NaiveDate,
    calendar: &ReportingCalendar,
) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a PlacementRecord>,
{
    let bucket_of = |date: NaiveDate| match granularity {
        Granularity::Daily => date,
        Granularity::Weekly => ReportingCalendar::week_start(date),
    };
    let step = match granularity {
        Granularity::Daily => Duration::days(1),
        Granularity::Weekly => Duration::days(7),
    };

    let first = bucket_of(start.min(end));
    let last = bucket_of(end);

    let counts: Tally<NaiveDate> = records
        .into_iter()
        .filter_map(|record| record.dated_timestamp())
        .filter_map(|timestamp| calendar.local_date_from_millis(timestamp))
        .map(bucket_of)
        .filter(|bucket| *bucket >= first && *bucket <= last)
        .collect();

    let mut points = Vec::new();
    let mut cursor = first;
    while cursor <= last {
        points.push(TrendPoint {
            period_key: cursor.format("%Y-%m-%d").to_string(),
            period_start: calendar.start_of_day_millis(cursor),
            period_label: period_label(cursor, granularity),
            placements: counts.get(&cursor),
        });

        match cursor.checked_add_signed(step) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    points
}

fn period_label(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Daily => date.format("%b %-d").to_string(),
        Granularity::Weekly => format!("Week of {}", date.format("%b %-d")),
    }
}

/// Fixed-width weekly series for the highest-volume states.
///
/// Uses every record rather than the scoped set so the chart keeps its
/// width when the viewer narrows the range.
pub(crate) fn build_momentum(
    records: &[PlacementRecord],
    policy: &AnalyticsPolicy,
    calendar: &ReportingCalendar,
    now: DateTime<Utc>,
) -> Vec<StateMomentumSeries> {
    let limits = &policy.top_n;
    if limits.momentum_states == 0 || limits.momentum_weeks == 0 {
        return Vec::new();
    }

    let volumes: Tally<_> = records
        .iter()
        .map(|record| record.state)
        .filter(|state| policy.include_unknown_states || !state.is_unknown())
        .collect();

    let today = calendar.local_date(now);
    let current_week = ReportingCalendar::week_start(today);
    let back = i64::try_from(limits.momentum_weeks - 1).unwrap_or(i64::MAX);
    let first_week = Duration::try_weeks(back)
        .and_then(|span| current_week.checked_sub_signed(span))
        .unwrap_or(current_week);

    volumes
        .ranked()
        .into_iter()
        .take(limits.momentum_states)
        .map(|(state, total_placements)| StateMomentumSeries {
            state,
            total_placements,
            points: build_series(
                records.iter().filter(|record| record.state == state),
                Granularity::Weekly,
                first_week,
                today,
                calendar,
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::super::states::State;
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn dated(state: State, days_ago: i64) -> PlacementRecord {
        let instant = now() - Duration::days(days_ago);
        PlacementRecord {
            app_id: None,
            city: String::new(),
            state,
            placement_date: Some(instant.date_naive()),
            placement_timestamp: instant.timestamp_millis(),
            placement_date_raw: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn daily_series_fills_gaps_inclusively() {
        let records = vec![dated(State::Texas, 0), dated(State::Texas, 2), dated(State::Ohio, 2)];
        let calendar = ReportingCalendar::utc();

        let points = build_series(
            &records,
            Granularity::Daily,
            date(2026, 10, 12),
            date(2026, 10, 16),
            &calendar,
        );

        assert_eq!(points.len(), 5);
        assert_eq!(points[0].period_key, "2026-10-12");
        assert_eq!(points[0].period_label, "Oct 12");
        let counts: Vec<usize> = points.iter().map(|point| point.placements).collect();
        assert_eq!(counts, vec![0, 0, 2, 0, 1]);
    }

    #[test]
    fn weekly_series_is_keyed_by_monday_midnight() {
        let records = vec![dated(State::Texas, 0), dated(State::Texas, 10)];
        let calendar = ReportingCalendar::utc();

        let points = build_series(
            &records,
            Granularity::Weekly,
            date(2026, 9, 30),
            date(2026, 10, 16),
            &calendar,
        );

        let keys: Vec<&str> = points.iter().map(|point| point.period_key.as_str()).collect();
        assert_eq!(keys, vec!["2026-09-28", "2026-10-05", "2026-10-12"]);
        assert_eq!(
            points[0].period_start,
            Utc.with_ymd_and_hms(2026, 9, 28, 0, 0, 0)
                .unwrap()
                .timestamp_millis()
        );
        assert_eq!(points[0].period_label, "Week of Sep 28");
        let counts: Vec<usize> = points.iter().map(|point| point.placements).collect();
        assert_eq!(counts, vec![0, 1, 1]);
    }

    #[test]
    fn start_after_end_collapses_to_one_bucket() {
        let points = build_series(
            std::iter::empty(),
            Granularity::Daily,
            date(2026, 11, 1),
            date(2026, 10, 16),
            &ReportingCalendar::utc(),
        );
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].period_key, "2026-10-16");
    }

    #[test]
    fn span_start_prefers_cutoff_then_earliest_record() {
        let calendar = ReportingCalendar::utc();
        let records = vec![dated(State::Texas, 3), dated(State::Ohio, 12)];
        let scoped: Vec<&PlacementRecord> = records.iter().collect();

        let cutoff = now() - Duration::days(30);
        assert_eq!(
            span_start(Some(cutoff), &scoped, &calendar, now()),
            date(2026, 9, 16)
        );
        assert_eq!(span_start(None, &scoped, &calendar, now()), date(2026, 10, 4));
        assert_eq!(span_start(None, &[], &calendar, now()), date(2026, 9, 16));
    }

    #[test]
    fn momentum_tracks_top_states_over_fixed_weeks() {
        let mut records = Vec::new();
        for _ in 0..3 {
            records.push(dated(State::Texas, 1));
        }
        records.push(dated(State::Ohio, 400));
        records.push(dated(State::Ohio, 8));
        records.push(dated(State::Maine, 2));

        let mut policy = AnalyticsPolicy::operations();
        policy.top_n.momentum_states = 2;

        let series = build_momentum(&records, &policy, &ReportingCalendar::utc(), now());
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].state, State::Texas);
        assert_eq!(series[1].state, State::Ohio);
        assert_eq!(series[1].total_placements, 2);
        assert!(series.iter().all(|entry| entry.points.len() == 16));

        let ohio_weekly: usize = series[1].points.iter().map(|point| point.placements).sum();
        assert_eq!(ohio_weekly, 1, "records older than the window are not bucketed");
    }
}
