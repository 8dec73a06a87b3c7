//! Folding per-game stat deltas into season totals.

use crate::models::{LeagueState, Player, PlayerId, PlayerStatDelta, Stats};
use std::collections::BTreeMap;

/// Return a copy of `state` with every delta added to its player's season stats.
pub fn apply_stat_deltas(state: &LeagueState, deltas: &[PlayerStatDelta]) -> LeagueState {
    let mut next = state.clone();
    fold_deltas(&mut next.players, deltas);
    next
}

pub(crate) fn fold_deltas(players: &mut BTreeMap<PlayerId, Player>, deltas: &[PlayerStatDelta]) {
    for d in deltas {
        match players.get_mut(&d.player_id) {
            Some(p) => p.stats.absorb(&d.delta),
            None => log::warn!("Dropping stat delta for unknown player {}", d.player_id),
        }
    }
}

/// Zero every player's season stats.
pub(crate) fn reset_stats(players: &mut BTreeMap<PlayerId, Player>) {
    for p in players.values_mut() {
        p.stats = Stats::default();
    }
}
