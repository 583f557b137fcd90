use super::super::record::PlacementRecord;
use super::super::states::State;
use super::super::tally::Tally;
use super::stats::share_pct;
use super::views::{CityHotspotRow, StateTotalRow};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CityKey {
    city: String,
    state: State,
}

#[derive(Debug, Default)]
pub(crate) struct LocationTotals {
    pub(crate) state_counts: Tally<State>,
    pub(crate) state_totals: Vec<StateTotalRow>,
    /// Every city with a name, ranked; callers cap it.
    pub(crate) cities: Vec<CityHotspotRow>,
}

pub(crate) fn aggregate(scoped: &[&PlacementRecord]) -> LocationTotals {
    let total = scoped.len();
    let mut state_counts = Tally::default();
    let mut city_counts = Tally::default();
    let mut latest: BTreeMap<State, i64> = BTreeMap::new();

    for record in scoped {
        state_counts.add(record.state);

        if !record.city.is_empty() {
            city_counts.add(CityKey {
                city: record.city.clone(),
                state: record.state,
            });
        }

        if let Some(timestamp) = record.dated_timestamp() {
            latest
                .entry(record.state)
                .and_modify(|current| *current = (*current).max(timestamp))
                .or_insert(timestamp);
        }
    }

    let state_totals = state_counts
        .ranked()
        .into_iter()
        .map(|(state, placements)| StateTotalRow {
            state,
            region: state.region(),
            placements,
            share: share_pct(placements, total),
            last_placement_timestamp: latest.get(&state).copied(),
        })
        .collect();

    let cities = city_counts
        .ranked()
        .into_iter()
        .map(|(key, placements)| CityHotspotRow {
            region: key.state.region(),
            city: key.city,
            state: key.state,
            placements,
            share: share_pct(placements, total),
        })
        .collect();

    LocationTotals {
        state_counts,
        state_totals,
        cities,
    }
}

pub(crate) fn top_cities(cities: &[CityHotspotRow], limit: usize) -> Vec<CityHotspotRow> {
    cities.iter().take(limit).cloned().collect()
}

/// Cities of the drill state, in ranked order. Empty without a selection.
pub(crate) fn city_drilldown(
    cities: &[CityHotspotRow],
    selected_state: Option<State>,
    limit: usize,
) -> Vec<CityHotspotRow> {
    let Some(selected) = selected_state else {
        return Vec::new();
    };

    cities
        .iter()
        .filter(|row| row.state == selected)
        .take(limit)
        .cloned()
        .collect()
}
