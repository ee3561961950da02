//! Overworld Randomizer (spec.md §4.7, C7).
//!
//! Two independent sub-functions: swap Link's starting screen with an
//! eligible target, and insert a Bait-gated blocker without disconnecting
//! the overworld graph. Grounded on `interval.rs`'s brute-force,
//! deterministically-ordered traversal style, applied here to a screen
//! adjacency graph instead of an offset interval set.

use std::collections::{BTreeMap, BTreeSet};

use failure::{format_err, Error};
use log::info;

use zora_rom::world::Terrain;
use zora_rom::DataTable;

use crate::rng::Rng;
use crate::flags::Flags;

fn is_base_passable(terrain: Terrain) -> bool {
    matches!(terrain, Terrain::Plain | Terrain::Forest | Terrain::Graveyard)
}

/// Screens are treated as having "empty" enemy groups under group id 0, by
/// convention of the synthesized world model (no vanilla base image is
/// available to read a real sentinel from).
fn has_empty_enemy_group(enemy_group: u8) -> bool {
    enemy_group == 0
}

/// Choose a target overworld screen whose enemy group is empty and whose
/// terrain permits Link's spawn sprite; swap enemy-group pointers between
/// the original and target screens, then commit the new start screen.
fn shuffle_start_screen(table: &mut DataTable, rng: &mut Rng) -> Result<(), Error> {
    let current = table.start_screen();

    let mut candidates: Vec<u8> = table
        .screens
        .values()
        .filter(|s| s.is_start_candidate && has_empty_enemy_group(s.enemy_group) && s.screen_id != current)
        .map(|s| s.screen_id)
        .collect();
    candidates.sort_unstable();

    let target = *rng
        .choice(&candidates)
        .ok_or_else(|| format_err!("no eligible overworld start-screen candidate"))?;

    table.swap_enemy_groups(current, target)?;
    table.set_start_screen(target)?;
    info!("start screen moved from {} to {}", current, target);
    Ok(())
}

fn passable_edges(table: &DataTable) -> Vec<(u8, u8)> {
    let mut edges = BTreeSet::new();
    for screen in table.screens.values() {
        if !is_base_passable(screen.terrain) {
            continue;
        }
        for &neighbor_id in &screen.adjacency {
            if let Some(neighbor) = table.screens.get(&neighbor_id) {
                if is_base_passable(neighbor.terrain) {
                    let edge = if screen.screen_id < neighbor_id {
                        (screen.screen_id, neighbor_id)
                    } else {
                        (neighbor_id, screen.screen_id)
                    };
                    edges.insert(edge);
                }
            }
        }
    }
    edges.into_iter().collect()
}

/// Flood-fill `start`'s connected component over `edges`, visiting
/// neighbors in sorted order at every step (spec.md §4.7 "iterating the
/// vertex set uses `sorted(partition_a)` order to preserve determinism").
fn connected_component(start: u8, edges: &[(u8, u8)]) -> BTreeSet<u8> {
    let mut adjacency: BTreeMap<u8, Vec<u8>> = BTreeMap::new();
    for &(a, b) in edges {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }

    let mut visited = BTreeSet::new();
    let mut stack = vec![start];
    visited.insert(start);
    while let Some(node) = stack.pop() {
        if let Some(neighbors) = adjacency.get(&node) {
            let mut sorted_neighbors = neighbors.clone();
            sorted_neighbors.sort_unstable();
            for n in sorted_neighbors {
                if visited.insert(n) {
                    stack.push(n);
                }
            }
        }
    }
    visited
}

/// Pick a bridge edge in the passable-terrain graph and gate it behind the
/// Bait item. A bridge is required: removing any other edge leaves the
/// graph connected, so gating it would add no real partition (spec.md §4.7
/// "the overworld graph MUST remain connected across the two partitions").
fn insert_bait_blocker(table: &mut DataTable, rng: &mut Rng) -> Result<(), Error> {
    let edges = passable_edges(table);
    let mut candidates = edges.clone();
    rng.shuffle(&mut candidates);

    for (a, b) in candidates {
        let remaining: Vec<(u8, u8)> = edges.iter().copied().filter(|&e| e != (a, b)).collect();
        let partition_a = connected_component(a, &remaining);
        if !partition_a.contains(&b) {
            table.mark_bait_blocked(a, b);
            info!("bait blocker inserted between screens {} and {}", a, b);
            return Ok(());
        }
    }

    Err(format_err!("no bridging overworld edge available for a bait blocker"))
}

/// Entry point: apply whichever of the two sub-functions the flags enable.
pub fn randomize_overworld(table: &mut DataTable, flags: &Flags, rng: &mut Rng) -> Result<(), Error> {
    if flags.is_set("overworld_start_shuffle") {
        shuffle_start_screen(table, rng)?;
    }
    if flags.is_set("bait_blocker") {
        insert_bait_blocker(table, rng)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zora_rom::verify;

    fn fixture_table() -> DataTable {
        DataTable::new(&vec![0u8; verify::IMAGE_SIZE]).unwrap()
    }

    #[test]
    fn start_screen_shuffle_swaps_enemy_groups_symmetrically() {
        let mut table = fixture_table();
        let old_start = table.start_screen();
        let old_start_group = table.screens[&old_start].enemy_group;

        let mut rng = Rng::from_seed(3);
        shuffle_start_screen(&mut table, &mut rng).unwrap();

        let new_start = table.start_screen();
        assert_ne!(new_start, old_start);
        assert_eq!(table.screens[&new_start].enemy_group, old_start_group);
    }

    #[test]
    fn bait_blocker_leaves_graph_reconnectable_through_the_gate() {
        let mut table = fixture_table();
        let mut rng = Rng::from_seed(11);
        insert_bait_blocker(&mut table, &mut rng).unwrap();

        let gated: Vec<(u8, u8)> = table
            .screens
            .values()
            .flat_map(|s| s.bait_blocked_adjacency.iter().map(move |&n| (s.screen_id, n)))
            .collect();
        assert!(!gated.is_empty());
    }

    #[test]
    fn randomize_overworld_is_a_noop_with_no_flags_set() {
        let mut table = fixture_table();
        let flags = Flags::new();
        let mut rng = Rng::from_seed(1);
        let start = table.start_screen();
        randomize_overworld(&mut table, &flags, &mut rng).unwrap();
        assert_eq!(table.start_screen(), start);
    }
}
