//! Inventory (spec.md §4.3, C3).
//!
//! Progressive upgrades are modeled as a `map<class, tier>` rather than by
//! overwriting a slot value, per the Design Note in spec.md §9; plain items
//! accumulate in a separate multiset. Grounded structurally on
//! `rando/src/state.rs`'s `BTreeMap`/`BTreeSet` discipline for deterministic
//! traversal, applied here to the bag of acquired items instead of to
//! unplaced-item bookkeeping.

use std::collections::BTreeMap;

use zora_rom::item::{Item, ProgressiveClass, Tier};

#[derive(Clone, Debug, Default)]
pub struct Inventory {
    tiers: BTreeMap<ProgressiveClass, Tier>,
    counts: BTreeMap<Item, u32>,
    /// Flag-driven health bookkeeping (spec.md §9 Open Question (a)).
    minimum_health: u8,
    current_health: u8,
}

impl Inventory {
    pub fn new() -> Self {
        Self {
            minimum_health: 3,
            current_health: 3,
            ..Default::default()
        }
    }

    /// Grows the bag monotonically: a progressive item raises its class's
    /// recorded tier (never lowers it); a non-progressive item increments
    /// its count. Validation never calls the inverse (spec.md §4.3 "the
    /// inventory is never decremented by validation").
    pub fn add(&mut self, item: Item) {
        if let (Some(class), Some(tier)) = (item.progressive_class(), item.tier()) {
            let entry = self.tiers.entry(class).or_insert(tier);
            if tier > *entry {
                *entry = tier;
            }
        } else {
            *self.counts.entry(item).or_insert(0) += 1;
        }
    }

    /// Membership for a non-progressive item; tier-threshold membership for
    /// a progressive one (spec.md §4.3).
    pub fn has(&self, item: &Item) -> bool {
        if let (Some(class), Some(tier)) = (item.progressive_class(), item.tier()) {
            self.tiers.get(&class).map_or(false, |t| *t >= tier)
        } else {
            self.counts.get(item).copied().unwrap_or(0) > 0
        }
    }

    pub fn tier(&self, class: ProgressiveClass) -> Option<Tier> {
        self.tiers.get(&class).copied()
    }

    pub fn count(&self, item: &Item) -> u32 {
        self.counts.get(item).copied().unwrap_or(0)
    }

    pub fn to_sorted_debug_string(&self) -> String {
        let mut parts = Vec::new();
        for (class, tier) in &self.tiers {
            parts.push(format!("{:?}={:?}", class, tier));
        }
        for (item, count) in &self.counts {
            parts.push(format!("{:?}x{}", item, count));
        }
        parts.sort();
        parts.join(", ")
    }

    pub fn set_minimum_health(&mut self, minimum: u8) {
        self.minimum_health = minimum;
        if self.current_health < self.minimum_health {
            self.current_health = self.minimum_health;
        }
    }

    /// Resolve the interaction between `keep_health_after_death_warp` and
    /// `increase_minimum_health` (spec.md §9 Open Question (a), resolved in
    /// DESIGN.md): minimum health applies first, then the restored health
    /// from a death warp is clamped up to at least that minimum.
    pub fn apply_death_warp(&mut self, restored_health: u8, keep_health: bool) {
        let base = if keep_health {
            self.current_health.max(restored_health)
        } else {
            restored_health
        };
        self.current_health = base.max(self.minimum_health);
    }

    pub fn current_health(&self) -> u8 {
        self.current_health
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zora_rom::item::RupeeValue;

    #[test]
    fn progressive_upgrade_removes_lower_tiers_conceptually() {
        let mut inv = Inventory::new();
        inv.add(Item::WoodSword);
        inv.add(Item::MagicalSword);
        assert!(inv.has(&Item::WhiteSword));
        assert_eq!(inv.tier(ProgressiveClass::Sword), Some(Tier::Third));
        assert_eq!(inv.count(&Item::MagicalSword), 0);
    }

    #[test]
    fn downgrade_attempt_does_not_lower_tier() {
        let mut inv = Inventory::new();
        inv.add(Item::MagicalSword);
        inv.add(Item::WoodSword);
        assert_eq!(inv.tier(ProgressiveClass::Sword), Some(Tier::Third));
    }

    #[test]
    fn non_progressive_items_are_counted() {
        let mut inv = Inventory::new();
        inv.add(Item::Rupee(RupeeValue::Five));
        inv.add(Item::Rupee(RupeeValue::Five));
        assert_eq!(inv.count(&Item::Rupee(RupeeValue::Five)), 2);
        assert!(inv.has(&Item::Rupee(RupeeValue::Five)));
    }

    #[test]
    fn death_warp_clamps_to_minimum_health() {
        let mut inv = Inventory::new();
        inv.set_minimum_health(5);
        inv.apply_death_warp(1, false);
        assert_eq!(inv.current_health(), 5);
        inv.apply_death_warp(8, true);
        assert_eq!(inv.current_health(), 8);
    }
}
