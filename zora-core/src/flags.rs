//! Flags & Codec (spec.md §4.4, C4).
//!
//! Grounded on `radix_fmt::radix_36` (already a teacher dependency, used in
//! `rando` to render the seed in base-36) — generalized here from "render a
//! u64 in base 36" to "render a bitset in base 8 over an 8-letter,
//! vowel-free alphabet". The registry/category shape (stable key, display
//! name, help text, enumerated category) mirrors `rando/src/lib.rs::Check`'s
//! `#[derive(Serialize, Deserialize)]` record style.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use failure::{format_err, Error};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use zora_rom::item::Item;

pub const FLAGSTRING_ALPHABET: [u8; 8] = *b"BCDFGHKL";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    ItemShuffle,
    DungeonShuffle,
    Overworld,
    Convenience,
    Gameplay,
    Aesthetic,
    Hints,
    Legacy,
    Hidden,
}

#[derive(Clone, Copy, Debug)]
pub struct FlagDef {
    pub key: &'static str,
    pub name: &'static str,
    pub help: &'static str,
    pub category: Category,
}

/// The 13 shuffle flags gated by `major_item_shuffle` (spec.md §4.4 master
/// toggle rule). Disabling the master forces all of these false atomically;
/// enabling the master does not re-enable them.
pub static DEPENDENT_SHUFFLE_FLAGS: &[&str] = &[
    "shuffle_overworld_caves",
    "shuffle_dungeon_items",
    "shuffle_armos_item",
    "shuffle_coast_item",
    "shuffle_shop_items",
    "shuffle_boss_items",
    "shuffle_ring_tiers",
    "shuffle_candle_tiers",
    "shuffle_arrow_tiers",
    "shuffle_boomerang_tiers",
    "shuffle_heart_containers",
    "shuffle_triforce_pieces",
    "shuffle_letter_cave",
];

lazy_static! {
    pub static ref FLAG_REGISTRY: Vec<FlagDef> = vec![
        FlagDef {
            key: "major_item_shuffle",
            name: "Shuffle Items",
            help: "Master toggle for item shuffling; disabling it forces every dependent shuffle flag off.",
            category: Category::ItemShuffle,
        },
        FlagDef { key: "shuffle_overworld_caves", name: "Shuffle Overworld Caves", help: "Shuffle the three items in every overworld cave.", category: Category::ItemShuffle },
        FlagDef { key: "shuffle_dungeon_items", name: "Shuffle Dungeon Items", help: "Shuffle dungeon room items across all nine levels.", category: Category::ItemShuffle },
        FlagDef { key: "shuffle_armos_item", name: "Shuffle Armos Item", help: "Include the Armos Knight's item in the pool.", category: Category::ItemShuffle },
        FlagDef { key: "shuffle_coast_item", name: "Shuffle Coast Item", help: "Include the coast item in the pool.", category: Category::ItemShuffle },
        FlagDef { key: "shuffle_shop_items", name: "Shuffle Shop Items", help: "Shuffle shop inventories.", category: Category::ItemShuffle },
        FlagDef { key: "shuffle_boss_items", name: "Shuffle Boss Items", help: "Shuffle dungeon-heart items dropped by bosses.", category: Category::ItemShuffle },
        FlagDef { key: "shuffle_ring_tiers", name: "Shuffle Ring Tiers", help: "Allow either ring tier to be placed independently.", category: Category::ItemShuffle },
        FlagDef { key: "shuffle_candle_tiers", name: "Shuffle Candle Tiers", help: "Allow either candle tier to be placed independently.", category: Category::ItemShuffle },
        FlagDef { key: "shuffle_arrow_tiers", name: "Shuffle Arrow Tiers", help: "Allow either arrow tier to be placed independently.", category: Category::ItemShuffle },
        FlagDef { key: "shuffle_boomerang_tiers", name: "Shuffle Boomerang Tiers", help: "Allow either boomerang tier to be placed independently.", category: Category::ItemShuffle },
        FlagDef { key: "shuffle_heart_containers", name: "Shuffle Heart Containers", help: "Shuffle heart container locations.", category: Category::ItemShuffle },
        FlagDef { key: "shuffle_triforce_pieces", name: "Shuffle Triforce Pieces", help: "Shuffle the eight triforce pieces among dungeon hearts.", category: Category::ItemShuffle },
        FlagDef { key: "shuffle_letter_cave", name: "Shuffle Letter Cave", help: "Include the letter cave's item in the pool.", category: Category::ItemShuffle },
        FlagDef { key: "force_sword_to_open_cave", name: "Sword In Open Cave", help: "Force the best available sword into the starting open cave.", category: Category::Gameplay },
        FlagDef { key: "force_arrow_to_level_nine", name: "Silver Arrow In Level 9", help: "Force the silver arrow to only ever appear in level 9.", category: Category::Gameplay },
        FlagDef { key: "force_two_heart_containers_to_level_nine", name: "Two Hearts In Level 9", help: "Force two heart containers into level 9's rooms.", category: Category::Gameplay },
        FlagDef { key: "allow_important_items_in_level_nine", name: "Allow Key Items In Level 9", help: "Allow the bow/ladder/raft/recorder to be placed in level 9.", category: Category::Gameplay },
        FlagDef { key: "overworld_start_shuffle", name: "Shuffle Start Screen", help: "Randomize Link's starting overworld screen.", category: Category::Overworld },
        FlagDef { key: "bait_blocker", name: "Bait Blockers", help: "Insert overworld blockers that require the Bait item to cross.", category: Category::Overworld },
        FlagDef { key: "open_stairs", name: "Open Stairs", help: "Remove the push-block gate in front of dungeon stairways.", category: Category::Convenience },
        FlagDef { key: "intro_skip", name: "Skip Intro", help: "Skip the title sequence on boot.", category: Category::Convenience },
        FlagDef { key: "text_speedup", name: "Fast Text", help: "Speed up dialogue text scroll rate.", category: Category::Convenience },
        FlagDef { key: "no_downgrade", name: "No Item Downgrades", help: "Never let a progressive item's tier decrease.", category: Category::Gameplay },
        FlagDef { key: "keep_health_after_death_warp", name: "Keep Health After Death Warp", help: "Retain current health instead of resetting it on a death warp.", category: Category::Gameplay },
        FlagDef { key: "increase_minimum_health", name: "Increase Minimum Health", help: "Raise the floor health never drops below.", category: Category::Gameplay },
        FlagDef { key: "randomize_enemy_groups", name: "Randomize Enemy Groups", help: "Shuffle overworld enemy group assignments.", category: Category::Overworld },
        FlagDef { key: "hint_hearts", name: "Hint Heart Locations", help: "Add shop hints pointing at heart container locations.", category: Category::Hints },
        FlagDef { key: "hint_triforce", name: "Hint Triforce Locations", help: "Add shop hints pointing at triforce piece locations.", category: Category::Hints },
        FlagDef { key: "legacy_third_quest_overworld", name: "Legacy Third-Quest Overworld", help: "Use the legacy alternate overworld layout (vanilla base image only).", category: Category::Legacy },
        FlagDef { key: "legacy_no_ladder_logic", name: "Legacy No-Ladder Logic", help: "Use the legacy (unsafe) ladderless logic (vanilla base image only).", category: Category::Legacy },
        FlagDef { key: "debug_verbose_validator", name: "Verbose Validator Logging", help: "Internal diagnostic flag, excluded from the flagstring.", category: Category::Hidden },
        FlagDef { key: "debug_force_solver_backend_a", name: "Force Solver Backend A", help: "Internal diagnostic flag, excluded from the flagstring.", category: Category::Hidden },
    ];
}

/// Non-`Hidden` flags, in declared order — this is the bit order the
/// flagstring codec uses (spec.md §4.4).
fn encodable_keys() -> Vec<&'static str> {
    FLAG_REGISTRY
        .iter()
        .filter(|f| f.category != Category::Hidden)
        .map(|f| f.key)
        .collect()
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ComplexFlags {
    pub starting_items: BTreeMap<Item, u32>,
    pub skip_items: BTreeMap<Item, u32>,
}

#[derive(Clone, Debug, Default)]
pub struct Flags {
    set: BTreeSet<&'static str>,
    pub complex: ComplexFlags,
}

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.set.contains(key)
    }

    /// Sets `key` to `value`, applying the master-toggle rule (spec.md
    /// §4.4): disabling `major_item_shuffle` atomically forces the 13
    /// dependent shuffle flags off too. Enabling it never re-enables them.
    pub fn set(&mut self, key: &'static str, value: bool) {
        if value {
            self.set.insert(key);
        } else {
            self.set.remove(key);
            if key == "major_item_shuffle" {
                for dep in DEPENDENT_SHUFFLE_FLAGS {
                    self.set.remove(dep);
                }
            }
        }
    }

    /// Forces every `Legacy`-category flag false unless `is_vanilla_base`
    /// (spec.md §4.4 "Legacy-category flags are valid only when the base
    /// image is the vanilla image; otherwise they are forced false").
    pub fn normalize_for_base(&mut self, is_vanilla_base: bool) {
        if is_vanilla_base {
            return;
        }
        for f in FLAG_REGISTRY.iter() {
            if f.category == Category::Legacy {
                self.set.remove(f.key);
            }
        }
    }

    /// Encode the non-complex flags into a flagstring (spec.md §4.4, §6).
    pub fn encode(&self) -> String {
        let keys = encodable_keys();
        let mut bits: Vec<bool> = keys.iter().map(|k| self.is_set(k)).collect();
        while bits.len() % 3 != 0 {
            bits.push(false);
        }

        let mut out = String::new();
        for chunk in bits.chunks(3) {
            let mut value = 0u8;
            for (i, b) in chunk.iter().enumerate() {
                if *b {
                    value |= 1 << (2 - i);
                }
            }
            out.push(FLAGSTRING_ALPHABET[value as usize] as char);
        }
        out
    }

    /// Decode a flagstring produced by `encode` (spec.md §4.4 round-trip
    /// law: `decode(encode(F)) == F` for every flag-set with only
    /// enumerated bits). Rejects any character outside
    /// `FLAGSTRING_ALPHABET` as `InvalidFlagstring`.
    pub fn decode(s: &str) -> Result<Flags, Error> {
        let keys = encodable_keys();
        let mut bits = Vec::with_capacity(s.len() * 3);

        for c in s.chars() {
            let byte = c as u32;
            if byte > 255 {
                return Err(format_err!("invalid flagstring character {:?}", c));
            }
            let idx = FLAGSTRING_ALPHABET
                .iter()
                .position(|&a| a == byte as u8)
                .ok_or_else(|| format_err!("invalid flagstring character {:?}", c))?;
            for i in 0..3 {
                bits.push((idx >> (2 - i)) & 1 == 1);
            }
        }

        let mut flags = Flags::new();
        for (i, key) in keys.iter().enumerate() {
            if bits.get(i).copied().unwrap_or(false) {
                flags.set(key, true);
            }
        }
        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_flagset_encodes_to_all_zero_alphabet_char() {
        let flags = Flags::new();
        let encoded = flags.encode();
        assert!(encoded.len() >= 5);
        assert!(encoded.chars().all(|c| c == 'B'));
    }

    #[test]
    fn round_trip_law_holds_for_a_single_flag() {
        let mut flags = Flags::new();
        flags.set("major_item_shuffle", true);
        let decoded = Flags::decode(&flags.encode()).unwrap();
        assert!(decoded.is_set("major_item_shuffle"));
        for key in encodable_keys() {
            assert_eq!(flags.is_set(key), decoded.is_set(key));
        }
    }

    #[test]
    fn round_trip_law_holds_for_many_flags() {
        let mut flags = Flags::new();
        flags.set("major_item_shuffle", true);
        flags.set("shuffle_overworld_caves", true);
        flags.set("bait_blocker", true);
        flags.set("intro_skip", true);
        let decoded = Flags::decode(&flags.encode()).unwrap();
        for key in encodable_keys() {
            assert_eq!(flags.is_set(key), decoded.is_set(key));
        }
    }

    #[test]
    fn decode_rejects_letters_outside_alphabet() {
        assert!(Flags::decode("AAAAA").is_err());
        assert!(Flags::decode("xxxxx").is_err());
    }

    #[test]
    fn disabling_master_toggle_forces_dependents_off() {
        let mut flags = Flags::new();
        flags.set("major_item_shuffle", true);
        flags.set("shuffle_dungeon_items", true);
        flags.set("major_item_shuffle", false);
        assert!(!flags.is_set("major_item_shuffle"));
        assert!(!flags.is_set("shuffle_dungeon_items"));
    }

    #[test]
    fn enabling_master_toggle_does_not_reenable_dependents() {
        let mut flags = Flags::new();
        flags.set("major_item_shuffle", false);
        flags.set("major_item_shuffle", true);
        assert!(!flags.is_set("shuffle_dungeon_items"));
    }

    #[test]
    fn legacy_flags_are_forced_off_on_non_vanilla_base() {
        let mut flags = Flags::new();
        flags.set("legacy_third_quest_overworld", true);
        flags.normalize_for_base(false);
        assert!(!flags.is_set("legacy_third_quest_overworld"));
    }

    #[test]
    fn legacy_flags_survive_on_vanilla_base() {
        let mut flags = Flags::new();
        flags.set("legacy_third_quest_overworld", true);
        flags.normalize_for_base(true);
        assert!(flags.is_set("legacy_third_quest_overworld"));
    }

    #[test]
    fn hidden_flags_are_excluded_from_the_flagstring() {
        let mut a = Flags::new();
        a.set("debug_verbose_validator", true);
        let mut b = Flags::new();
        assert_eq!(a.encode(), b.encode());
        b.set("debug_verbose_validator", true);
        assert_eq!(a.encode(), b.encode());
    }
}
