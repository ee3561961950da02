//! Item Randomizer (spec.md §4.6, C6).
//!
//! Reads flags, builds a solver `Problem` over the locations the active
//! shuffle flags enable, and writes the returned assignment into the Data
//! Table — the only authorized mutator of item-bearing locations. Grounded
//! on `rando/src/lib.rs::crypt_rando`/`global_rando`'s "filter chests,
//! shuffle, write back" shape, generalized from one flat shuffle into a
//! constrained permutation problem with forbids/requires.

use std::time::Duration;

use failure::Error;
use log::info;

use zora_rom::{DataTable, Item, Location, ProgressiveClass};

use crate::error::ZoraError;
use crate::flags::Flags;
use crate::rng::Rng;
use crate::solver::{make_backend, BackendKind, Problem};

const SOLVER_TIME_LIMIT: Duration = Duration::from_secs(5);
const MAX_RETRIES: u32 = 3;

fn is_shuffle_enabled(location: &Location, item: Item, flags: &Flags) -> bool {
    let category_enabled = match location {
        Location::OverworldCave { .. } => flags.is_set("shuffle_overworld_caves"),
        Location::DungeonRoom { .. } => flags.is_set("shuffle_dungeon_items"),
        Location::ArmosSlot => flags.is_set("shuffle_armos_item"),
        Location::CoastSlot => flags.is_set("shuffle_coast_item"),
        Location::ShopSlot { .. } => flags.is_set("shuffle_shop_items"),
    };
    if !category_enabled {
        return false;
    }

    match item.progressive_class() {
        Some(ProgressiveClass::Sword) => true,
        Some(ProgressiveClass::Boomerang) => flags.is_set("shuffle_boomerang_tiers"),
        Some(ProgressiveClass::Ring) => flags.is_set("shuffle_ring_tiers"),
        Some(ProgressiveClass::Candle) => flags.is_set("shuffle_candle_tiers"),
        Some(ProgressiveClass::Arrow) => flags.is_set("shuffle_arrow_tiers"),
        None => match item {
            Item::HeartContainer => flags.is_set("shuffle_heart_containers"),
            Item::TriforcePiece(_) => flags.is_set("shuffle_triforce_pieces"),
            _ => true,
        },
    }
}

/// The level-9 room set, used by the `force_arrow_to_level_nine` /
/// `allow_important_items_in_level_nine` forbids below.
fn is_level_nine(location: &Location) -> bool {
    matches!(location, Location::DungeonRoom { level: 9, .. })
}

fn best_sword(items: &[Item]) -> Option<Item> {
    items
        .iter()
        .copied()
        .filter(|i| i.progressive_class() == Some(ProgressiveClass::Sword))
        .max_by_key(|i| i.tier())
}

/// Shuffle item-bearing locations according to `flags`, writing the result
/// into `table`. Retries up to `MAX_RETRIES` times with a derived seed if
/// the solver comes back empty (spec.md §4.6); the caller is expected to
/// validate reachability afterward and to retry the whole item+validate
/// cycle with yet another derived seed on `Unbeatable` (spec.md §7).
pub fn randomize_items(table: &mut DataTable, flags: &Flags, seed: u64) -> Result<(), Error> {
    if !flags.is_set("major_item_shuffle") {
        return Ok(());
    }

    let mut locations: Vec<Location> = table
        .locations()
        .copied()
        .filter(|loc| {
            let item = table.get_item(loc).unwrap_or(Item::Nothing);
            is_shuffle_enabled(loc, item, flags)
        })
        .collect();
    locations.sort();

    let values: Vec<Item> = locations
        .iter()
        .map(|loc| table.get_item(loc).unwrap_or(Item::Nothing))
        .collect();

    let mut problem = Problem::add_permutation_problem(locations.clone(), values.clone());

    if flags.is_set("force_sword_to_open_cave") {
        let open_cave = Location::OverworldCave { screen_id: 0, slot_index: 0 };
        if locations.contains(&open_cave) {
            if let Some(sword) = best_sword(&values) {
                let non_swords: Vec<Item> = values
                    .iter()
                    .copied()
                    .filter(|i| i.progressive_class() != Some(ProgressiveClass::Sword))
                    .collect();
                problem.forbid_all(&[open_cave], &non_swords);
                problem.require(open_cave, sword);
            }
        }
    }

    if flags.is_set("force_arrow_to_level_nine") {
        let non_l9: Vec<Location> = locations.iter().copied().filter(|l| !is_level_nine(l)).collect();
        problem.forbid_all(&non_l9, &[Item::SilverArrow]);
    }

    if flags.is_set("force_two_heart_containers_to_level_nine") {
        let l9_rooms: Vec<Location> = locations.iter().copied().filter(|l| is_level_nine(l)).collect();
        if values.contains(&Item::HeartContainer) {
            problem.at_least_one_of(l9_rooms, vec![Item::HeartContainer, Item::HeartContainer]);
        }
    }

    if !flags.is_set("allow_important_items_in_level_nine") {
        let l9_rooms: Vec<Location> = locations.iter().copied().filter(|l| is_level_nine(l)).collect();
        let gated = [Item::Bow, Item::Ladder, Item::Raft, Item::Recorder];
        problem.forbid_all(&l9_rooms, &gated);
    }

    let backend = make_backend::<Location, Item>(BackendKind::default());

    let mut attempt = 0u32;
    let mut current_seed = seed;
    loop {
        match backend.solve(&problem, current_seed, SOLVER_TIME_LIMIT) {
            Some(assignment) => {
                for (loc, item) in assignment {
                    table.set_item(loc, item)?;
                }
                info!("item randomizer placed {} items on attempt {}", locations.len(), attempt);
                return Ok(());
            }
            None => {
                attempt += 1;
                if attempt > MAX_RETRIES {
                    return Err(ZoraError::NoFeasibleAssignment { seed }.into());
                }
                current_seed = Rng::derive_seed(seed, attempt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zora_rom::verify;

    fn fixture_table() -> DataTable {
        DataTable::new(&vec![0u8; verify::IMAGE_SIZE]).unwrap()
    }

    #[test]
    fn does_nothing_when_master_toggle_is_off() {
        let mut table = fixture_table();
        let flags = Flags::new();
        randomize_items(&mut table, &flags, 1).unwrap();
        assert!(table.locations().next().is_some());
    }

    #[test]
    fn shuffling_preserves_item_conservation() {
        let mut table = fixture_table();
        let mut flags = Flags::new();
        flags.set("major_item_shuffle", true);
        flags.set("shuffle_overworld_caves", true);
        flags.set("shuffle_dungeon_items", true);
        flags.set("shuffle_armos_item", true);
        flags.set("shuffle_coast_item", true);
        flags.set("shuffle_shop_items", true);

        let before: Vec<Item> = table.locations().map(|l| table.get_item(l).unwrap()).collect();
        randomize_items(&mut table, &flags, 42).unwrap();
        let after: Vec<Item> = table.locations().map(|l| table.get_item(l).unwrap()).collect();

        let mut before_sorted = before;
        before_sorted.sort_by_key(|i| i.stable_id());
        let mut after_sorted = after;
        after_sorted.sort_by_key(|i| i.stable_id());
        assert_eq!(before_sorted, after_sorted);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let mut table_a = fixture_table();
        let mut table_b = fixture_table();
        let mut flags = Flags::new();
        flags.set("major_item_shuffle", true);
        flags.set("shuffle_overworld_caves", true);

        randomize_items(&mut table_a, &flags, 7).unwrap();
        randomize_items(&mut table_b, &flags, 7).unwrap();

        for loc in table_a.locations() {
            assert_eq!(table_a.get_item(loc), table_b.get_item(loc));
        }
    }
}
