use super::super::calendar::ReportingCalendar;
use super::super::record::PlacementRecord;
use super::super::states::State;
use super::super::tally::Tally;
use super::stats::round_to;
use super::views::{SeasonalityCell, SeasonalityGrid, SeasonalityMonth, StateTotalRow};
use chrono::{DateTime, NaiveDate, Utc};

pub(crate) const SEASONALITY_MONTHS: u32 = 12;

/// Dense heatmap of the top states across the trailing twelve calendar
/// months. Intensity is each cell over the single largest cell.
pub(crate) fn build_seasonality(
    scoped: &[&PlacementRecord],
    state_totals: &[StateTotalRow],
    include_unknown: bool,
    limit: usize,
    calendar: &ReportingCalendar,
    now: DateTime<Utc>,
) -> SeasonalityGrid {
    let states: Vec<State> = state_totals
        .iter()
        .filter(|row| include_unknown || !row.state.is_unknown())
        .take(limit)
        .map(|row| row.state)
        .collect();

    let today = calendar.local_date(now);
    let month_starts = ReportingCalendar::trailing_months(today, SEASONALITY_MONTHS);

    let counts: Tally<(State, NaiveDate)> = scoped
        .iter()
        .filter(|record| states.contains(&record.state))
        .filter_map(|record| {
            let timestamp = record.dated_timestamp()?;
            let date = calendar.local_date_from_millis(timestamp)?;
            Some((record.state, ReportingCalendar::month_start(date)))
        })
        .collect();

    let grid_max = states
        .iter()
        .flat_map(|state| {
            month_starts
                .iter()
                .map(|month| counts.get(&(*state, *month)))
        })
        .max()
        .unwrap_or(0);

    let months: Vec<SeasonalityMonth> = month_starts
        .iter()
        .enumerate()
        .map(|(month_index, month)| SeasonalityMonth {
            month_index,
            month_key: month.format("%Y-%m").to_string(),
            month_label: month.format("%b %Y").to_string(),
        })
        .collect();

    let mut cells = Vec::with_capacity(states.len() * months.len());
    for (state_index, state) in states.iter().enumerate() {
        for (month, start) in months.iter().zip(&month_starts) {
            let placements = counts.get(&(*state, *start));
            let intensity = if grid_max == 0 {
                0.0
            } else {
                round_to(placements as f64 / grid_max as f64, 3)
            };
            cells.push(SeasonalityCell {
                state: *state,
                state_index,
                month_label: month.month_label.clone(),
                month_index: month.month_index,
                placements,
                intensity,
            });
        }
    }

    SeasonalityGrid {
        states,
        months,
        cells,
        grid_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn dated(state: State, instant: DateTime<Utc>) -> PlacementRecord {
        PlacementRecord {
            app_id: None,
            city: String::new(),
            state,
            placement_date: Some(instant.date_naive()),
            placement_timestamp: instant.timestamp_millis(),
            placement_date_raw: None,
        }
    }

    fn totals(rows: &[(State, usize)]) -> Vec<StateTotalRow> {
        rows.iter()
            .map(|(state, placements)| StateTotalRow {
                state: *state,
                region: state.region(),
                placements: *placements,
                share: 0.0,
                last_placement_timestamp: None,
            })
            .collect()
    }

    #[test]
    fn grid_is_dense_and_normalized() {
        let records = vec![
            dated(State::Texas, now()),
            dated(State::Texas, now() - Duration::days(1)),
            dated(State::Texas, Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap()),
            dated(State::Ohio, Utc.with_ymd_and_hms(2026, 9, 2, 0, 0, 0).unwrap()),
            dated(State::Ohio, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()),
        ];
        let scoped: Vec<&PlacementRecord> = records.iter().collect();
        let state_totals = totals(&[(State::Texas, 3), (State::Ohio, 2)]);

        let grid = build_seasonality(
            &scoped,
            &state_totals,
            true,
            15,
            &ReportingCalendar::utc(),
            now(),
        );

        assert_eq!(grid.cells.len(), 2 * 12);
        assert_eq!(grid.months[0].month_label, "Nov 2025");
        assert_eq!(grid.months[11].month_key, "2026-10");
        assert_eq!(grid.grid_max, 2);

        let texas_october = grid
            .cells
            .iter()
            .find(|cell| cell.state == State::Texas && cell.month_index == 11)
            .expect("cell");
        assert_eq!(texas_october.placements, 2);
        assert_eq!(texas_october.intensity, 1.0);

        let ohio_september = grid
            .cells
            .iter()
            .find(|cell| cell.state == State::Ohio && cell.month_index == 10)
            .expect("cell");
        assert_eq!(ohio_september.intensity, 0.5);
        assert_eq!(ohio_september.state_index, 1);

        let counted: usize = grid.cells.iter().map(|cell| cell.placements).sum();
        assert_eq!(counted, 4, "records older than twelve months fall outside the grid");
        assert!(grid
            .cells
            .iter()
            .all(|cell| (0.0..=1.0).contains(&cell.intensity)));
    }

    #[test]
    fn empty_grid_has_zero_intensity() {
        let state_totals = totals(&[(State::Texas, 0)]);
        let grid = build_seasonality(
            &[],
            &state_totals,
            true,
            15,
            &ReportingCalendar::utc(),
            now(),
        );

        assert_eq!(grid.grid_max, 0);
        assert_eq!(grid.cells.len(), 12);
        assert!(grid.cells.iter().all(|cell| cell.intensity == 0.0));
    }

    #[test]
    fn unknown_states_follow_the_inclusion_flag() {
        let state_totals = totals(&[(State::Unknown, 5), (State::Texas, 1)]);
        let grid = build_seasonality(
            &[],
            &state_totals,
            false,
            15,
            &ReportingCalendar::utc(),
            now(),
        );
        assert_eq!(grid.states, vec![State::Texas]);
    }
}
