//! Item model (spec.md §3 "Item", §4.3).
//!
//! Roughly 30 kinds, each carrying a stable identifier, a progressive class
//! (or none), and a category used by the solver's constraints. Grounded on
//! the "enum-with-payload, not stringly-typed" Design Note in spec.md §9.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProgressiveClass {
    Sword,
    Boomerang,
    Ring,
    Candle,
    Arrow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    First,
    Second,
    Third,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Major,
    Minor,
    DungeonHeart,
    Shop,
    Nothing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RupeeValue {
    One,
    Five,
    Twenty,
    Hundred,
}

impl RupeeValue {
    pub fn count(&self) -> u16 {
        match self {
            RupeeValue::One => 1,
            RupeeValue::Five => 5,
            RupeeValue::Twenty => 20,
            RupeeValue::Hundred => 100,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Item {
    WoodSword,
    WhiteSword,
    MagicalSword,
    WoodBoomerang,
    MagicalBoomerang,
    BlueRing,
    RedRing,
    BlueCandle,
    RedCandle,
    WoodArrow,
    SilverArrow,
    Bow,
    Ladder,
    Raft,
    Recorder,
    Bait,
    Bomb,
    Bracelet,
    Letter,
    Potion,
    MagicalKey,
    Compass,
    Map,
    HeartContainer,
    TriforcePiece(u8),
    Rupee(RupeeValue),
    SmallKey,
    Nothing,
}

impl Item {
    /// The identifier used by the solver and by the patch's item-id byte.
    /// Stable across runs; not the same as the base image's raw id (which
    /// belongs to `zora_rom::slot`). Every variant maps to a unique byte so
    /// this round-trips through `from_raw_id`.
    pub fn stable_id(&self) -> u8 {
        match self {
            Item::WoodSword => 0,
            Item::WhiteSword => 1,
            Item::MagicalSword => 2,
            Item::WoodBoomerang => 3,
            Item::MagicalBoomerang => 4,
            Item::BlueRing => 5,
            Item::RedRing => 6,
            Item::BlueCandle => 7,
            Item::RedCandle => 8,
            Item::WoodArrow => 9,
            Item::SilverArrow => 10,
            Item::Bow => 11,
            Item::Ladder => 12,
            Item::Raft => 13,
            Item::Recorder => 14,
            Item::Bait => 15,
            Item::Bomb => 16,
            Item::Bracelet => 17,
            Item::Letter => 18,
            Item::Potion => 19,
            Item::MagicalKey => 20,
            Item::Compass => 21,
            Item::Map => 22,
            Item::HeartContainer => 23,
            Item::TriforcePiece(n) => 24 + *n,
            Item::Rupee(RupeeValue::One) => 40,
            Item::Rupee(RupeeValue::Five) => 41,
            Item::Rupee(RupeeValue::Twenty) => 42,
            Item::Rupee(RupeeValue::Hundred) => 43,
            Item::SmallKey => 44,
            Item::Nothing => 255,
        }
    }

    /// Inverse of `stable_id`. Returns `None` for an id with no assigned
    /// meaning (reserved for future item kinds).
    pub fn from_raw_id(id: u8) -> Option<Item> {
        Some(match id {
            0 => Item::WoodSword,
            1 => Item::WhiteSword,
            2 => Item::MagicalSword,
            3 => Item::WoodBoomerang,
            4 => Item::MagicalBoomerang,
            5 => Item::BlueRing,
            6 => Item::RedRing,
            7 => Item::BlueCandle,
            8 => Item::RedCandle,
            9 => Item::WoodArrow,
            10 => Item::SilverArrow,
            11 => Item::Bow,
            12 => Item::Ladder,
            13 => Item::Raft,
            14 => Item::Recorder,
            15 => Item::Bait,
            16 => Item::Bomb,
            17 => Item::Bracelet,
            18 => Item::Letter,
            19 => Item::Potion,
            20 => Item::MagicalKey,
            21 => Item::Compass,
            22 => Item::Map,
            23 => Item::HeartContainer,
            24..=31 => Item::TriforcePiece(id - 24),
            40 => Item::Rupee(RupeeValue::One),
            41 => Item::Rupee(RupeeValue::Five),
            42 => Item::Rupee(RupeeValue::Twenty),
            43 => Item::Rupee(RupeeValue::Hundred),
            44 => Item::SmallKey,
            255 => Item::Nothing,
            _ => return None,
        })
    }

    pub fn progressive_class(&self) -> Option<ProgressiveClass> {
        match self {
            Item::WoodSword | Item::WhiteSword | Item::MagicalSword => Some(ProgressiveClass::Sword),
            Item::WoodBoomerang | Item::MagicalBoomerang => Some(ProgressiveClass::Boomerang),
            Item::BlueRing | Item::RedRing => Some(ProgressiveClass::Ring),
            Item::BlueCandle | Item::RedCandle => Some(ProgressiveClass::Candle),
            Item::WoodArrow | Item::SilverArrow => Some(ProgressiveClass::Arrow),
            _ => None,
        }
    }

    pub fn tier(&self) -> Option<Tier> {
        match self {
            Item::WoodSword | Item::WoodBoomerang | Item::BlueRing | Item::BlueCandle | Item::WoodArrow => {
                Some(Tier::First)
            }
            Item::WhiteSword
            | Item::MagicalBoomerang
            | Item::RedRing
            | Item::RedCandle
            | Item::SilverArrow => Some(Tier::Second),
            Item::MagicalSword => Some(Tier::Third),
            _ => None,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Item::Nothing => Category::Nothing,
            Item::Rupee(_) | Item::SmallKey => Category::Minor,
            Item::Compass | Item::Map => Category::Shop,
            Item::TriforcePiece(_) | Item::HeartContainer => Category::DungeonHeart,
            _ => Category::Major,
        }
    }

    /// Whether this item is required to be reachable for a seed to be
    /// beatable (spec.md §3 Invariant 3).
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Item::TriforcePiece(_)
                | Item::Bow
                | Item::SilverArrow
                | Item::Ladder
                | Item::Raft
                | Item::Recorder
                | Item::WoodSword
                | Item::WhiteSword
                | Item::MagicalSword
        )
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swords_share_a_progressive_class_with_increasing_tiers() {
        assert_eq!(Item::WoodSword.progressive_class(), Some(ProgressiveClass::Sword));
        assert_eq!(Item::MagicalSword.progressive_class(), Some(ProgressiveClass::Sword));
        assert!(Item::WoodSword.tier() < Item::MagicalSword.tier());
    }

    #[test]
    fn triforce_pieces_are_required() {
        assert!(Item::TriforcePiece(1).is_required());
        assert!(!Item::Rupee(RupeeValue::Five).is_required());
    }

    #[test]
    fn stable_id_round_trips() {
        let items = [
            Item::WoodSword,
            Item::MagicalSword,
            Item::TriforcePiece(7),
            Item::Rupee(RupeeValue::Hundred),
            Item::SmallKey,
            Item::Nothing,
        ];
        for item in items {
            assert_eq!(Item::from_raw_id(item.stable_id()), Some(item));
        }
    }

    #[test]
    fn unassigned_id_decodes_to_none() {
        assert_eq!(Item::from_raw_id(200), None);
    }
}
