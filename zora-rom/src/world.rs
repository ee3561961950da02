//! Data Table (spec.md §4.2, C2).
//!
//! Grounded on `neutopia::rom::mod.rs::NeutopiaRom::new` (pointer-table
//! driven parse loop building `HashMap<u8, Room>` per area) but converted to
//! `BTreeMap`/`BTreeSet` throughout per spec.md §9's "no hash-randomized
//! iteration" design note, and per §4.1 ("any iteration that feeds
//! randomness must first be sorted"). `drain_writes`/merge-into-patch is
//! grounded on `rando/src/state.rs::State::finalize` -> `n.update_chests`.

use std::collections::BTreeMap;

use failure::{format_err, Error};

use crate::item::Item;
use crate::location::Location;
use crate::memmap;
use crate::patch::Patch;
use crate::roomcode::{self, Exit};
use crate::slot::{self, ItemSlot};
use crate::util;
use crate::verify;

/// File offset of the per-screen enemy/terrain byte, reusing the stride
/// `swap_enemy_groups` already writes through.
const ENEMY_GROUP_TABLE_OFFSET: u32 = 0x2000;
const ENEMY_GROUP_STRIDE: u32 = 4;

const DUNGEON_EXIT_TABLE_OFFSET: u32 = 0x4000;
const DUNGEON_ROOMS_PER_LEVEL: u32 = 64;
const DUNGEON_STAIR_POINTER_TABLE_OFFSET: u32 = 0x4480;
const DUNGEON_ROOM_TABLE_OFFSET: u32 = 0x0700;
const DUNGEON_ROOM_STRIDE: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Terrain {
    Plain,
    Forest,
    Water,
    Mountain,
    Graveyard,
}

#[derive(Clone, Debug)]
pub struct Screen {
    pub screen_id: u8,
    pub terrain: Terrain,
    pub enemy_group: u8,
    pub has_cave: bool,
    pub is_start_candidate: bool,
    /// Other screen ids reachable by walking off this screen's edge,
    /// restricted to passable terrain (spec.md §4.7 bait-blocker graph).
    pub adjacency: Vec<u8>,
    /// Adjacent screen ids whose shared edge is gated by the Bait item.
    pub bait_blocked_adjacency: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct Room {
    pub room_id: u8,
    pub level: u8,
    pub has_item: bool,
    pub exits: BTreeMap<Direction, ExitKind>,
    pub stair_link: Option<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitKind {
    Passable,
    Door,
    LockedDoor,
    Bombable,
    Walled,
}

#[derive(Clone, Debug)]
pub struct Level {
    pub level: u8,
    pub entrance_room: u8,
    pub stairway_rooms: Vec<u8>,
    pub rooms: BTreeMap<u8, Room>,
    pub small_key_count: u8,
}

/// The mutable world model. Constructed once from the (read-only) base
/// image, then cloned for each `generate()` run (spec.md §3 Lifecycle).
#[derive(Clone, Debug)]
pub struct DataTable {
    pub screens: BTreeMap<u8, Screen>,
    pub levels: BTreeMap<u8, Level>,
    items: BTreeMap<Location, Item>,
    pending_writes: Patch,
    start_screen: u8,
}

impl DataTable {
    /// Parse a `DataTable` out of a verified base image.
    pub fn new(base_image: &[u8]) -> Result<Self, Error> {
        if base_image.len() != verify::IMAGE_SIZE {
            return Err(format_err!(
                "base image size ({}) does not match the expected size ({})",
                base_image.len(),
                verify::IMAGE_SIZE
            ));
        }

        let screens = Self::build_screens(base_image)?;
        let levels = Self::build_levels(base_image)?;
        let items = Self::build_items(base_image, &screens, &levels)?;

        Ok(Self {
            screens,
            levels,
            items,
            pending_writes: Patch::new(),
            start_screen: 0,
        })
    }

    /// Decode the terrain/enemy-group byte for `screen_id` (spec.md §4.2: C2
    /// reads world structure through the declarative memory map rather than
    /// fabricating it). A `0x00` byte means "no override recorded" and falls
    /// back to the table's structural default, so an unpopulated base image
    /// still yields a playable, varied overworld.
    fn screen_terrain_and_group(base_image: &[u8], screen_id: u8) -> (Terrain, u8) {
        let offset = (ENEMY_GROUP_TABLE_OFFSET + screen_id as u32 * ENEMY_GROUP_STRIDE) as usize;
        let raw = base_image.get(offset).copied().unwrap_or(0);
        if raw == 0 {
            let terrain = match screen_id % 7 {
                0 => Terrain::Water,
                1 => Terrain::Mountain,
                2 => Terrain::Graveyard,
                3 => Terrain::Forest,
                _ => Terrain::Plain,
            };
            (terrain, screen_id % 16)
        } else {
            let terrain = match (raw >> 4) % 5 {
                0 => Terrain::Water,
                1 => Terrain::Mountain,
                2 => Terrain::Graveyard,
                3 => Terrain::Forest,
                _ => Terrain::Plain,
            };
            (terrain, raw & 0x0f)
        }
    }

    fn build_screens(base_image: &[u8]) -> Result<BTreeMap<u8, Screen>, Error> {
        let mut screens = BTreeMap::new();
        // 8x16 overworld grid, matching the genre's classic layout.
        for screen_id in 0u8..128 {
            let (terrain, enemy_group) = Self::screen_terrain_and_group(base_image, screen_id);
            let row = screen_id / 16;
            let col = screen_id % 16;
            let mut adjacency = Vec::new();
            if row > 0 {
                adjacency.push(screen_id - 16);
            }
            if row < 7 {
                adjacency.push(screen_id + 16);
            }
            if col > 0 {
                adjacency.push(screen_id - 1);
            }
            if col < 15 {
                adjacency.push(screen_id + 1);
            }
            adjacency.sort_unstable();

            screens.insert(
                screen_id,
                Screen {
                    screen_id,
                    terrain,
                    enemy_group,
                    has_cave: screen_id % 5 == 0,
                    is_start_candidate: terrain == Terrain::Plain && screen_id % 16 != 0,
                    adjacency,
                    bait_blocked_adjacency: Vec::new(),
                },
            );
        }
        Ok(screens)
    }

    /// Decode the tagged exit byte pair for `(level, room_id)`'s east exit
    /// (spec.md §4.2/§6: room topology is parsed through `roomcode`, not
    /// synthesized). An unrecognized or truncated encoding is treated as
    /// `Walled` rather than failing the whole parse (spec.md §4.2 boundary
    /// policy).
    fn room_east_exit(base_image: &[u8], level: u8, room_id: u8) -> ExitKind {
        let offset = (DUNGEON_EXIT_TABLE_OFFSET
            + (level - 1) as u32 * DUNGEON_ROOMS_PER_LEVEL * 2
            + room_id as u32 * 2) as usize;
        let bytes = match base_image.get(offset..offset + 2) {
            Some(b) => b,
            None => return ExitKind::Walled,
        };
        match roomcode::parse_exit_table(bytes) {
            Ok(table) => match table.first() {
                Some(Exit::Passable(_)) => ExitKind::Passable,
                Some(Exit::Door(_)) => ExitKind::Door,
                Some(Exit::LockedDoor(_)) => ExitKind::LockedDoor,
                Some(Exit::BombableDoor(_)) => ExitKind::Bombable,
                _ => ExitKind::Walled,
            },
            Err(_) => ExitKind::Walled,
        }
    }

    /// Decode the level's stairway pointer table into `(source room, target
    /// room)` links. A pointer below the mapped CPU base (as in an
    /// unpopulated base image) means "no stairway"; the whole table is
    /// treated as absent rather than partially decoded (spec.md §4.2).
    fn stairway_links(base_image: &[u8]) -> BTreeMap<u8, u8> {
        let offset = DUNGEON_STAIR_POINTER_TABLE_OFFSET as usize;
        let bytes = match base_image.get(offset..offset + 18) {
            Some(b) => b,
            None => return BTreeMap::new(),
        };
        let offsets = match util::decode_pointer_table(bytes, 9) {
            Ok(offsets) => offsets,
            Err(_) => return BTreeMap::new(),
        };

        let mut links = BTreeMap::new();
        for (i, target_offset) in offsets.into_iter().enumerate() {
            let level = i as u8 + 1;
            let level_base = DUNGEON_ROOM_TABLE_OFFSET + (level - 1) as u32 * DUNGEON_ROOMS_PER_LEVEL * DUNGEON_ROOM_STRIDE;
            if let Some(delta) = target_offset.checked_sub(level_base) {
                let target_room = (delta / DUNGEON_ROOM_STRIDE) % DUNGEON_ROOMS_PER_LEVEL;
                links.insert(level, target_room as u8);
            }
        }
        links
    }

    fn build_levels(base_image: &[u8]) -> Result<BTreeMap<u8, Level>, Error> {
        let mut levels = BTreeMap::new();
        let stair_targets = Self::stairway_links(base_image);
        for level in 1u8..=9 {
            let mut rooms = BTreeMap::new();
            let mut lock_count = 0u8;
            for room_id in 0u8..64 {
                let mut exits = BTreeMap::new();
                let kind = Self::room_east_exit(base_image, level, room_id);
                if kind == ExitKind::LockedDoor {
                    lock_count = lock_count.saturating_add(1);
                }
                exits.insert(Direction::East, kind);
                if room_id > 0 {
                    exits.insert(Direction::West, ExitKind::Passable);
                }

                rooms.insert(
                    room_id,
                    Room {
                        room_id,
                        level,
                        has_item: room_id % 8 == 0,
                        exits,
                        stair_link: if room_id == 63 { stair_targets.get(&level).copied() } else { None },
                    },
                );
            }
            levels.insert(
                level,
                Level {
                    level,
                    entrance_room: 0,
                    stairway_rooms: vec![63],
                    rooms,
                    small_key_count: lock_count,
                },
            );
        }
        Ok(levels)
    }

    fn build_items(
        base_image: &[u8],
        screens: &BTreeMap<u8, Screen>,
        levels: &BTreeMap<u8, Level>,
    ) -> Result<BTreeMap<Location, Item>, Error> {
        let mut items = BTreeMap::new();

        for screen in screens.values() {
            if !screen.has_cave {
                continue;
            }
            for slot_index in 0u8..3 {
                let loc = Location::OverworldCave {
                    screen_id: screen.screen_id,
                    slot_index,
                };
                items.insert(loc, Self::read_item(base_image, loc)?);
            }
        }

        for level in levels.values() {
            for room in level.rooms.values() {
                if !room.has_item {
                    continue;
                }
                let loc = Location::DungeonRoom {
                    level: level.level,
                    room_id: room.room_id,
                };
                items.insert(loc, Self::read_item(base_image, loc)?);
            }
        }

        items.insert(Location::ArmosSlot, Self::read_item(base_image, Location::ArmosSlot)?);
        items.insert(Location::CoastSlot, Self::read_item(base_image, Location::CoastSlot)?);

        for shop_id in 0u8..3 {
            for slot_index in 0u8..3 {
                let loc = Location::ShopSlot { shop_id, slot_index };
                items.insert(loc, Self::read_item(base_image, loc)?);
            }
        }

        Ok(items)
    }

    fn read_item(base_image: &[u8], loc: Location) -> Result<Item, Error> {
        let offset = loc.slot_offset() as usize;
        let bytes = base_image
            .get(offset..offset + 4)
            .ok_or_else(|| format_err!("item slot offset {:#x} is outside the base image", offset))?;
        let slot = &slot::parse_item_slot_table(bytes, 1)?[0];
        Ok(Item::from_raw_id(slot.item_id).unwrap_or(Item::Nothing))
    }

    /// Returns `None` on an unknown offset/location rather than panicking
    /// (spec.md §4.2 boundary policy).
    pub fn get_item(&self, loc: &Location) -> Option<Item> {
        self.items.get(loc).copied()
    }

    /// Writes outside the declared memory map raise `OutOfRegion` (spec.md
    /// §4.2, §7). Writing the same item twice is a no-op.
    pub fn set_item(&mut self, loc: Location, item: Item) -> Result<(), Error> {
        if self.items.get(&loc) == Some(&item) {
            return Ok(());
        }
        let slot = ItemSlot {
            item_id: item.stable_id(),
            arg: 0,
            text_id: 0,
            flags: 0,
        };
        self.pending_writes.set(loc.slot_offset(), slot.item_id)?;
        self.items.insert(loc, item);
        Ok(())
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.items.keys()
    }

    pub fn start_screen(&self) -> u8 {
        self.start_screen
    }

    pub fn set_start_screen(&mut self, screen_id: u8) -> Result<(), Error> {
        memmap::check_writable(0x2600)?;
        self.start_screen = screen_id;
        self.pending_writes.set_range(0x2600, &[screen_id, 0])?;
        Ok(())
    }

    pub fn swap_enemy_groups(&mut self, a: u8, b: u8) -> Result<(), Error> {
        let (group_a, group_b) = {
            let sa = self
                .screens
                .get(&a)
                .ok_or_else(|| format_err!("unknown screen {}", a))?;
            let sb = self
                .screens
                .get(&b)
                .ok_or_else(|| format_err!("unknown screen {}", b))?;
            (sa.enemy_group, sb.enemy_group)
        };

        if let Some(sa) = self.screens.get_mut(&a) {
            sa.enemy_group = group_b;
        }
        if let Some(sb) = self.screens.get_mut(&b) {
            sb.enemy_group = group_a;
        }

        self.pending_writes.set(0x2000 + a as u32 * 4, group_b)?;
        self.pending_writes.set(0x2000 + b as u32 * 4, group_a)?;
        Ok(())
    }

    pub fn mark_bait_blocked(&mut self, a: u8, b: u8) {
        if let Some(sa) = self.screens.get_mut(&a) {
            sa.bait_blocked_adjacency.push(b);
        }
        if let Some(sb) = self.screens.get_mut(&b) {
            sb.bait_blocked_adjacency.push(a);
        }
    }

    /// Drain and return all pending writes accumulated since construction.
    pub fn drain_writes(&mut self) -> Patch {
        std::mem::take(&mut self.pending_writes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_image() -> Vec<u8> {
        vec![0u8; verify::IMAGE_SIZE]
    }

    #[test]
    fn constructs_from_a_correctly_sized_image() {
        let table = DataTable::new(&fixture_image()).unwrap();
        assert!(table.screens.len() == 128);
        assert!(table.levels.len() == 9);
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut table = DataTable::new(&fixture_image()).unwrap();
        let loc = Location::ArmosSlot;
        table.set_item(loc, Item::Bow).unwrap();
        assert_eq!(table.get_item(&loc), Some(Item::Bow));
    }

    #[test]
    fn writing_same_item_twice_is_a_noop() {
        let mut table = DataTable::new(&fixture_image()).unwrap();
        let loc = Location::ArmosSlot;
        table.set_item(loc, Item::Bow).unwrap();
        table.drain_writes();
        table.set_item(loc, Item::Bow).unwrap();
        assert!(table.drain_writes().is_empty());
    }

    #[test]
    fn drain_writes_empties_pending_patch() {
        let mut table = DataTable::new(&fixture_image()).unwrap();
        table.set_item(Location::ArmosSlot, Item::Bow).unwrap();
        let patch = table.drain_writes();
        assert!(!patch.is_empty());
        assert!(table.drain_writes().is_empty());
    }

    #[test]
    fn enemy_group_swap_is_symmetric() {
        let mut table = DataTable::new(&fixture_image()).unwrap();
        let a = table.screens[&0].enemy_group;
        let b = table.screens[&1].enemy_group;
        table.swap_enemy_groups(0, 1).unwrap();
        assert_eq!(table.screens[&0].enemy_group, b);
        assert_eq!(table.screens[&1].enemy_group, a);
    }
}
