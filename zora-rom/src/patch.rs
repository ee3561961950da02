//! Patch Engine (spec.md §4.9, C9).
//!
//! Represents changes as an offset-keyed map, iterated in ascending-offset
//! order for both hashing and emission (spec.md §3 "Patch"). Grounded on
//! `rando/src/lib.rs::apply_patch`'s `Seek`+`write_all` idiom for
//! `apply_to`; the map itself is new (Neutopia writes straight into a
//! `Cursor<Vec<u8>>` and never materializes a patch object).

use std::collections::BTreeMap;

use failure::{format_err, Error};
use log::warn;

use crate::memmap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Patch {
    writes: BTreeMap<u32, u8>,
}

impl Patch {
    pub fn new() -> Self {
        Self {
            writes: BTreeMap::new(),
        }
    }

    /// Record a single byte write. Writing the same byte to the same offset
    /// twice is a no-op; writing a different byte overrides (spec.md §4.2
    /// "mutations are idempotent").
    pub fn set(&mut self, offset: u32, byte: u8) -> Result<(), Error> {
        memmap::check_writable(offset)?;
        self.writes.insert(offset, byte);
        Ok(())
    }

    /// Record a contiguous run of byte writes starting at `offset`.
    pub fn set_range(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Error> {
        for (i, b) in bytes.iter().enumerate() {
            self.set(offset + i as u32, *b)?;
        }
        Ok(())
    }

    /// Merge `other` into `self`. Conflicting offsets resolve last-writer-
    /// wins, with a logged warning unless the bytes already agree (spec.md
    /// §4.9).
    pub fn merge(&mut self, other: &Patch) {
        for (&offset, &byte) in &other.writes {
            match self.writes.get(&offset) {
                Some(&existing) if existing == byte => {}
                Some(&existing) => {
                    warn!(
                        "patch merge conflict at offset {:#x}: {:#04x} overridden by {:#04x}",
                        offset, existing, byte
                    );
                }
                None => {}
            }
            self.writes.insert(offset, byte);
        }
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.writes.iter().map(|(&o, &b)| (o, b))
    }

    /// 64-bit rolling hash over the offset-sorted `(offset, byte)` sequence
    /// (spec.md §6): for each pair, feed the 4 little-endian bytes of
    /// `offset` followed by the byte. A fixed FNV-1a-style accumulator is
    /// used because it is a few lines of portable arithmetic, bit-exactly
    /// specified here, with no dependency needed for a single function.
    pub fn hash(&self) -> u64 {
        const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut h = FNV_OFFSET_BASIS;
        for (offset, byte) in self.iter() {
            for b in offset.to_le_bytes() {
                h ^= b as u64;
                h = h.wrapping_mul(FNV_PRIME);
            }
            h ^= byte as u64;
            h = h.wrapping_mul(FNV_PRIME);
        }
        h
    }

    /// Apply this patch over `base`, returning the resulting image. Errors
    /// if any recorded offset falls outside `base`'s bounds.
    pub fn apply_to(&self, base: &[u8]) -> Result<Vec<u8>, Error> {
        let mut out = base.to_vec();
        for (offset, byte) in self.iter() {
            let idx = offset as usize;
            if idx >= out.len() {
                return Err(format_err!(
                    "patch offset {:#x} is outside the {}-byte base image",
                    offset,
                    out.len()
                ));
            }
            out[idx] = byte;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotent_same_byte_write() {
        let mut p = Patch::new();
        p.set(0x0010, 7).unwrap();
        p.set(0x0010, 7).unwrap();
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn overriding_write_replaces() {
        let mut p = Patch::new();
        p.set(0x0010, 7).unwrap();
        p.set(0x0010, 9).unwrap();
        assert_eq!(p.iter().next(), Some((0x0010, 9)));
    }

    #[test]
    fn rejects_header_writes() {
        let mut p = Patch::new();
        assert!(p.set(0, 1).is_err());
    }

    #[test]
    fn hash_depends_only_on_sorted_content() {
        let mut a = Patch::new();
        a.set(0x0020, 1).unwrap();
        a.set(0x0010, 2).unwrap();

        let mut b = Patch::new();
        b.set(0x0010, 2).unwrap();
        b.set(0x0020, 1).unwrap();

        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn apply_to_writes_bytes_at_offsets() {
        let mut p = Patch::new();
        p.set(0x0010, 0xab).unwrap();
        let base = vec![0u8; crate::verify::IMAGE_SIZE];
        let out = p.apply_to(&base).unwrap();
        assert_eq!(out[0x0010], 0xab);
    }

    #[test]
    fn merge_is_last_writer_wins() {
        let mut a = Patch::new();
        a.set(0x0010, 1).unwrap();
        let mut b = Patch::new();
        b.set(0x0010, 2).unwrap();
        a.merge(&b);
        assert_eq!(a.iter().next(), Some((0x0010, 2)));
    }
}
