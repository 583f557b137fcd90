use super::stats::share_pct;
use super::views::{ParetoRow, StateTotalRow};

/// Top states by volume with a running cumulative share of the scoped
/// total. Expects `state_totals` already ranked.
pub(crate) fn build_pareto(
    state_totals: &[StateTotalRow],
    scoped_total: usize,
    include_unknown: bool,
    limit: usize,
) -> Vec<ParetoRow> {
    let mut running = 0usize;

    state_totals
        .iter()
        .filter(|row| include_unknown || !row.state.is_unknown())
        .take(limit)
        .enumerate()
        .map(|(index, row)| {
            running += row.placements;
            ParetoRow {
                rank: index + 1,
                state: row.state,
                placements: row.placements,
                share: share_pct(row.placements, scoped_total),
                cumulative_share: share_pct(running, scoped_total),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::super::states::State;
    use super::*;

    fn row(state: State, placements: usize) -> StateTotalRow {
        StateTotalRow {
            state,
            region: state.region(),
            placements,
            share: 0.0,
            last_placement_timestamp: None,
        }
    }

    #[test]
    fn cumulative_share_is_monotonic_and_reaches_total() {
        let totals = vec![
            row(State::Texas, 5),
            row(State::California, 3),
            row(State::Ohio, 1),
            row(State::Maine, 1),
        ];

        let pareto = build_pareto(&totals, 10, true, 12);
        let cumulative: Vec<f64> = pareto.iter().map(|row| row.cumulative_share).collect();
        assert_eq!(cumulative, vec![50.0, 80.0, 90.0, 100.0]);
        assert!(pareto
            .windows(2)
            .all(|pair| pair[0].cumulative_share <= pair[1].cumulative_share));
        assert_eq!(pareto[3].rank, 4);
    }

    #[test]
    fn truncation_and_unknown_exclusion_keep_share_below_total() {
        let totals = vec![
            row(State::Unknown, 4),
            row(State::Texas, 3),
            row(State::Ohio, 2),
            row(State::Maine, 1),
        ];

        let pareto = build_pareto(&totals, 10, false, 2);
        assert_eq!(pareto.len(), 2);
        assert_eq!(pareto[0].state, State::Texas);
        assert_eq!(pareto[0].rank, 1);
        assert_eq!(pareto[1].cumulative_share, 50.0);
    }

    #[test]
    fn empty_total_yields_zero_shares() {
        let totals = vec![row(State::Texas, 0)];
        let pareto = build_pareto(&totals, 0, true, 12);
        assert_eq!(pareto[0].share, 0.0);
        assert_eq!(pareto[0].cumulative_share, 0.0);
    }
}
