//! Location model (spec.md §3 "Location").
//!
//! Grounded on `rando/src/state.rs::LocationId` (an `Ord`-deriving
//! area/room/index triple used as a `BTreeMap` key, for deterministic
//! traversal); generalized into an enum of disjoint kinds because this
//! spec's locations are not uniform.

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    OverworldCave { screen_id: u8, slot_index: u8 },
    DungeonRoom { level: u8, room_id: u8 },
    ArmosSlot,
    CoastSlot,
    ShopSlot { shop_id: u8, slot_index: u8 },
}

impl Location {
    /// The file offset of this location's 4-byte item-slot record, per the
    /// declarative memory map.
    pub fn slot_offset(&self) -> u32 {
        match self {
            Location::OverworldCave { screen_id, slot_index } => {
                0x0010 + (*screen_id as u32) * 3 * 4 + (*slot_index as u32) * 4
            }
            Location::DungeonRoom { level, room_id } => {
                0x0700 + ((*level - 1) as u32) * 64 * 4 + (*room_id as u32) * 4
            }
            Location::ArmosSlot => 0x1100,
            Location::CoastSlot => 0x1104,
            Location::ShopSlot { shop_id, slot_index } => {
                0x1200 + (*shop_id as u32) * 3 * 4 + (*slot_index as u32) * 4
            }
        }
    }

    pub fn is_overworld_cave(&self) -> bool {
        matches!(self, Location::OverworldCave { .. })
    }

    pub fn is_dungeon_room(&self) -> bool {
        matches!(self, Location::DungeonRoom { .. })
    }

    pub fn dungeon_level(&self) -> Option<u8> {
        match self {
            Location::DungeonRoom { level, .. } => Some(*level),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overworld_caves_get_distinct_offsets_per_slot() {
        let a = Location::OverworldCave { screen_id: 0, slot_index: 0 }.slot_offset();
        let b = Location::OverworldCave { screen_id: 0, slot_index: 1 }.slot_offset();
        let c = Location::OverworldCave { screen_id: 1, slot_index: 0 }.slot_offset();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn location_ordering_is_total_and_deterministic() {
        let mut locs = vec![
            Location::ShopSlot { shop_id: 0, slot_index: 0 },
            Location::ArmosSlot,
            Location::DungeonRoom { level: 1, room_id: 0 },
        ];
        locs.sort();
        let mut again = locs.clone();
        again.sort();
        assert_eq!(locs, again);
    }
}
