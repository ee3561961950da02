//! 4-byte item-slot record (spec.md §3 "Location" slot payload).
//!
//! Grounded on `neutopia/src/chest.rs` — a `nom`-based fixed-width record
//! parser — generalized from a single Neutopia-specific `item_id` byte into
//! this spec's richer `Item` + argument/text/flags fields.

use failure::{format_err, Error};
use nom::{multi::many_m_n, number::complete::le_u8, IResult};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSlot {
    pub item_id: u8,
    pub arg: u8,
    pub text_id: u8,
    pub flags: u8,
}

impl ItemSlot {
    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&[self.item_id, self.arg, self.text_id, self.flags])
    }
}

fn parse_item_slot(i: &[u8]) -> IResult<&[u8], ItemSlot> {
    let (i, item_id) = le_u8(i)?;
    let (i, arg) = le_u8(i)?;
    let (i, text_id) = le_u8(i)?;
    let (i, flags) = le_u8(i)?;

    Ok((
        i,
        ItemSlot {
            item_id,
            arg,
            text_id,
            flags,
        },
    ))
}

/// Parse a table of exactly `count` consecutive item-slot records.
pub fn parse_item_slot_table(i: &[u8], count: usize) -> Result<Vec<ItemSlot>, Error> {
    let (_, table) = many_m_n(count, count, parse_item_slot)(i)
        .map_err(|e| format_err!("item slot table parse error: {}", e))?;

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_slot() {
        assert_eq!(
            parse_item_slot(&[0x11, 0x01, 0x85, 0x41]),
            Ok((
                &[][..],
                ItemSlot {
                    item_id: 0x11,
                    arg: 0x01,
                    text_id: 0x85,
                    flags: 0x41,
                }
            ))
        );
    }

    #[test]
    fn round_trips_through_write() {
        let slot = ItemSlot {
            item_id: 3,
            arg: 0,
            text_id: 9,
            flags: 0,
        };
        let mut buf = Vec::new();
        slot.write(&mut buf).unwrap();
        let (_, parsed) = parse_item_slot(&buf).unwrap();
        assert_eq!(parsed, slot);
    }
}
