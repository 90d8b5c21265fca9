//! Merging of local and external game results by guid.

use std::collections::{HashMap, HashSet};

use crate::catalog::{ExternalGame, GameRecord};

/// Merge local and external results into one list unique by guid.
///
/// Local records keep their order and win on shared guids; duplicate guids
/// inside either list collapse to their first occurrence. External records
/// with unseen guids are appended in catalog order and also returned
/// separately, since those are the ones that still need caching.
pub fn merge_results(
    local: Vec<GameRecord>,
    external: Vec<ExternalGame>,
) -> (Vec<GameRecord>, Vec<ExternalGame>) {
    let mut seen: HashSet<String> = HashSet::with_capacity(local.len() + external.len());
    let mut merged = Vec::with_capacity(local.len() + external.len());

    for record in local {
        if seen.insert(record.guid.clone()) {
            merged.push(record);
        }
    }

    let mut discovered = Vec::new();
    for game in external {
        if seen.insert(game.record.guid.clone()) {
            merged.push(game.record.clone());
            discovered.push(game);
        }
    }

    (merged, discovered)
}

/// Replace records with their cached versions, matched by guid.
///
/// Order and membership are unchanged; records with no cached counterpart are
/// left as they are. Returns how many records were replaced.
pub fn attach_cached(games: &mut [GameRecord], cached: Vec<GameRecord>) -> usize {
    let mut by_guid: HashMap<String, GameRecord> =
        cached.into_iter().map(|g| (g.guid.clone(), g)).collect();

    let mut replaced = 0;
    for game in games.iter_mut().filter(|g| !g.is_cached()) {
        if let Some(stored) = by_guid.remove(&game.guid) {
            *game = stored;
            replaced += 1;
        }
    }
    replaced
}
