use super::super::calendar::DAY_MS;
use super::super::policy::AnalyticsPolicy;
use super::super::record::PlacementRecord;
use super::super::states::State;
use super::stats::round_to;
use super::views::StatePaceRow;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub(crate) const PACE_WINDOW_DAYS: i64 = 30;
pub(crate) const GROWTH_FLOOR_PCT: f64 = -100.0;
pub(crate) const GROWTH_CEILING_PCT: f64 = 300.0;

/// Growth of `recent` over `prior`, in percent.
///
/// No activity at all is flat, a state with no prior activity counts as
/// +100%, and small denominators are clamped to [-100, 300].
pub fn growth_percentage(recent: usize, prior: usize) -> f64 {
    match (recent, prior) {
        (0, 0) => 0.0,
        (_, 0) => 100.0,
        (recent, prior) => {
            let raw = (recent as f64 - prior as f64) / prior as f64 * 100.0;
            round_to(raw.clamp(GROWTH_FLOOR_PCT, GROWTH_CEILING_PCT), 1)
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PaceWindow {
    recent: usize,
    prior: usize,
}

/// Trailing-30-day pace against the 30 days before it, for every state that
/// has at least one record. Range scope does not apply.
pub(crate) fn build_pace(
    records: &[PlacementRecord],
    policy: &AnalyticsPolicy,
    now: DateTime<Utc>,
) -> Vec<StatePaceRow> {
    let now_ms = now.timestamp_millis();
    let recent_start = now_ms.saturating_sub(PACE_WINDOW_DAYS * DAY_MS);
    let prior_start = now_ms.saturating_sub(2 * PACE_WINDOW_DAYS * DAY_MS);

    let mut windows: BTreeMap<State, PaceWindow> = BTreeMap::new();
    for record in records {
        if record.state.is_unknown() && !policy.include_unknown_states {
            continue;
        }

        let window = windows.entry(record.state).or_default();
        match record.dated_timestamp() {
            Some(timestamp) if timestamp >= recent_start => window.recent += 1,
            Some(timestamp) if timestamp >= prior_start => window.prior += 1,
            _ => {}
        }
    }

    let mut rows: Vec<StatePaceRow> = windows
        .into_iter()
        .map(|(state, window)| StatePaceRow {
            state,
            recent_placements: window.recent,
            prior_placements: window.prior,
            growth_delta: window.recent as i64 - window.prior as i64,
            growth_pct: growth_percentage(window.recent, window.prior),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.recent_placements
            .cmp(&a.recent_placements)
            .then_with(|| a.state.cmp(&b.state))
    });
    rows
}
