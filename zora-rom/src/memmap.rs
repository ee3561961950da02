//! Declarative memory map (spec.md §6).
//!
//! Every file-offset region that the randomization core may read or write is
//! named here; regions not declared are read-only (spec.md §4.2 boundary
//! policy). `DataTable` consults this table at construction time and again
//! on every write so that a typo'd offset fails as `OutOfRegion` instead of
//! silently corrupting the image.

use failure::{format_err, Error};
use log::warn;

use crate::error::ZoraError;
use crate::interval::IntervalStore;
use crate::verify::{HEADER_SIZE, IMAGE_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    ItemSlot,
    EnemyGroup,
    Pointer,
    HintText,
    ShopPrice,
    CompassPointer,
    RoomExit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

#[derive(Clone, Copy, Debug)]
pub struct MemRegion {
    pub name: &'static str,
    pub offset: u32,
    pub len: u32,
    pub kind: EntityKind,
    pub access: Access,
}

impl MemRegion {
    fn contains(&self, offset: u32) -> bool {
        offset >= self.offset && offset < self.offset + self.len
    }
}

/// The declared regions, in file-offset order. Every overworld/dungeon/shop
/// item-bearing region and every pointer table the randomizer touches must
/// appear here; this list is consulted, never bypassed.
pub static REGIONS: &[MemRegion] = &[
    MemRegion {
        name: "overworld-cave-table",
        offset: 0x0010,
        len: 0x0600, // 128 screens * 3 slots * 4 bytes
        kind: EntityKind::ItemSlot,
        access: Access::ReadWrite,
    },
    MemRegion {
        name: "dungeon-room-table",
        offset: 0x0700,
        len: 0x0900, // 9 levels * 64 rooms * 4 bytes
        kind: EntityKind::ItemSlot,
        access: Access::ReadWrite,
    },
    MemRegion {
        name: "singleton-slots",
        offset: 0x1100,
        len: 0x0008, // armos + coast, 4 bytes each
        kind: EntityKind::ItemSlot,
        access: Access::ReadWrite,
    },
    MemRegion {
        name: "shop-table",
        offset: 0x1200,
        len: 0x0060, // a handful of shops * 3 slots * 4 bytes
        kind: EntityKind::ItemSlot,
        access: Access::ReadWrite,
    },
    MemRegion {
        name: "enemy-group-table",
        offset: 0x2000,
        len: 0x0400,
        kind: EntityKind::EnemyGroup,
        access: Access::ReadWrite,
    },
    MemRegion {
        name: "compass-pointer-table",
        offset: 0x2400,
        len: 0x0200,
        kind: EntityKind::CompassPointer,
        access: Access::ReadWrite,
    },
    MemRegion {
        name: "start-screen-pointer",
        offset: 0x2600,
        len: 0x0002,
        kind: EntityKind::Pointer,
        access: Access::ReadWrite,
    },
    MemRegion {
        name: "shop-pricing",
        offset: 0x2700,
        len: 0x0060,
        kind: EntityKind::ShopPrice,
        access: Access::ReadWrite,
    },
    MemRegion {
        name: "hint-text",
        offset: 0x3000,
        len: 0x1000,
        kind: EntityKind::HintText,
        access: Access::ReadWrite,
    },
    MemRegion {
        name: "dungeon-exit-table",
        offset: 0x4000,
        len: 0x0480, // 9 levels * 64 rooms * 2 bytes (east-exit tag + arg)
        kind: EntityKind::RoomExit,
        access: Access::ReadOnly,
    },
    MemRegion {
        name: "dungeon-stair-pointer-table",
        offset: 0x4480,
        len: 0x0012, // 9 levels * 2-byte CPU pointer
        kind: EntityKind::Pointer,
        access: Access::ReadOnly,
    },
];

/// Returns the region declaring `offset`, if any.
pub fn region_for(offset: u32) -> Option<&'static MemRegion> {
    REGIONS.iter().find(|r| r.contains(offset))
}

/// Returns `Ok(())` if `offset` lies within a declared writable region,
/// `Err(OutOfRegion)` otherwise (spec.md §4.2, §7).
pub fn check_writable(offset: u32) -> Result<(), Error> {
    if (offset as usize) < HEADER_SIZE {
        warn!("offset {:#x} lies within the immutable header", offset);
        return Err(ZoraError::OutOfRegion(offset).into());
    }
    if offset as usize >= IMAGE_SIZE {
        warn!("offset {:#x} lies outside the base image", offset);
        return Err(ZoraError::OutOfRegion(offset).into());
    }
    match region_for(offset) {
        Some(r) if r.access == Access::ReadWrite => Ok(()),
        Some(r) => {
            warn!("offset {:#x} is in read-only region {}", offset, r.name);
            Err(ZoraError::OutOfRegion(offset).into())
        }
        None => {
            warn!("offset {:#x} is not in any declared region", offset);
            Err(ZoraError::OutOfRegion(offset).into())
        }
    }
}

/// Sanity-check that declared regions do not overlap. Exercised in tests and
/// by `zora-tools` at startup; not on the hot path.
pub fn assert_no_overlaps() -> Result<(), Error> {
    let mut store: IntervalStore<u32> = IntervalStore::new();
    let mut total_len = 0u32;
    for r in REGIONS {
        store.add(r.offset, r.offset + r.len);
        total_len += r.len;
    }
    let merged: u32 = store.get_intervals().iter().map(|i| i.end - i.start).sum();
    if merged != total_len {
        return Err(format_err!(
            "declared memory regions overlap: merged length {} != sum of lengths {}",
            merged,
            total_len
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_do_not_overlap() {
        assert_no_overlaps().unwrap();
    }

    #[test]
    fn header_is_never_writable() {
        assert!(check_writable(0).is_err());
        assert!(check_writable(15).is_err());
    }

    #[test]
    fn undeclared_offset_is_out_of_region() {
        assert!(check_writable(0xffff).is_err());
    }

    #[test]
    fn declared_offset_is_writable() {
        assert!(check_writable(0x0010).is_ok());
    }
}
