use super::super::states::{Region, State};
use super::super::tally::Tally;
use super::stats::share_pct;
use super::views::{RegionCoverageRow, RegionStateEntry, UntappedStateRow};

#[derive(Debug, Default)]
pub(crate) struct RegionalViews {
    pub(crate) regions: Vec<RegionCoverageRow>,
    pub(crate) untapped_states: Vec<UntappedStateRow>,
}

/// Fixed-region coverage built from the scoped state counts. Every
/// enumerated state participates, so zero-count states surface as untapped.
pub(crate) fn build_regions(
    state_counts: &Tally<State>,
    include_unknown: bool,
    region_state_limit: usize,
) -> RegionalViews {
    let scoped_total = state_counts.total();
    let mut regions: Vec<RegionCoverageRow> = Region::ordered()
        .into_iter()
        .filter_map(|region| {
            let mut entries: Vec<RegionStateEntry> = State::enumerated()
                .filter(|state| state.region() == region)
                .map(|state| RegionStateEntry {
                    state,
                    placements: state_counts.get(&state),
                })
                .collect();
            coverage_row(region, &mut entries, scoped_total, region_state_limit)
        })
        .collect();

    if include_unknown {
        let mut entries = vec![RegionStateEntry {
            state: State::Unknown,
            placements: state_counts.get(&State::Unknown),
        }];
        regions.extend(coverage_row(
            Region::Unknown,
            &mut entries,
            scoped_total,
            region_state_limit,
        ));
    }

    regions.sort_by(|a, b| {
        b.total_placements
            .cmp(&a.total_placements)
            .then_with(|| a.region.cmp(&b.region))
    });

    let mut untapped_states: Vec<UntappedStateRow> = State::enumerated()
        .filter(|state| state_counts.get(state) == 0)
        .map(|state| UntappedStateRow {
            state,
            region: state.region(),
            placements: 0,
        })
        .collect();
    untapped_states.sort_by(|a, b| a.state.cmp(&b.state));

    RegionalViews {
        regions,
        untapped_states,
    }
}

fn coverage_row(
    region: Region,
    entries: &mut Vec<RegionStateEntry>,
    scoped_total: usize,
    limit: usize,
) -> Option<RegionCoverageRow> {
    let total_placements: usize = entries.iter().map(|entry| entry.placements).sum();
    if total_placements == 0 {
        return None;
    }

    let active_states = entries.iter().filter(|entry| entry.placements > 0).count();
    entries.sort_by(|a, b| {
        b.placements
            .cmp(&a.placements)
            .then_with(|| a.state.cmp(&b.state))
    });
    let hidden_states = entries.len().saturating_sub(limit);
    entries.truncate(limit);

    Some(RegionCoverageRow {
        region,
        total_placements,
        share: share_pct(total_placements, scoped_total),
        active_states,
        states: std::mem::take(entries),
        truncated: hidden_states > 0,
        hidden_states,
    })
}
