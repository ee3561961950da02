//! Pointer/offset codecs for the declarative memory map (spec.md §6).
//!
//! Pointer tables in the base image store file offsets as little-endian
//! 16-bit words relative to the cartridge's CPU address space; converting to
//! a file offset means subtracting the load address and adding back the
//! fixed header length (spec.md §6: "any CPU-address form in documentation
//! is converted by adding 0x10").

use byteorder::{ByteOrder, LittleEndian};
use failure::{format_err, Error};

use crate::verify::HEADER_SIZE;

/// CPU load address of the first byte following the header.
const CPU_BASE: u32 = 0x8000;

/// Decode a little-endian 16-bit CPU pointer into a file offset.
pub fn pointer_to_rom_offset(data: &[u8]) -> Result<u32, Error> {
    if data.len() < 2 {
        return Err(format_err!("pointer table truncated"));
    }
    let cpu_addr = LittleEndian::read_u16(data) as u32;
    if cpu_addr < CPU_BASE {
        return Err(format_err!(
            "pointer {:#06x} is below the mapped CPU base {:#06x}",
            cpu_addr,
            CPU_BASE
        ));
    }
    Ok(cpu_addr - CPU_BASE + HEADER_SIZE as u32)
}

/// Encode a file offset back into a little-endian 16-bit CPU pointer.
pub fn rom_offset_to_pointer(offset: u32) -> [u8; 2] {
    let cpu_addr = offset - HEADER_SIZE as u32 + CPU_BASE;
    let mut buf = [0u8; 2];
    LittleEndian::write_u16(&mut buf, cpu_addr as u16);
    buf
}

/// Decode `count` consecutive 2-byte pointers starting at `data`, returning
/// their file offsets in table order.
pub fn decode_pointer_table(data: &[u8], count: usize) -> Result<Vec<u32>, Error> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let start = i * 2;
        let end = start + 2;
        if end > data.len() {
            return Err(format_err!("pointer table truncated at entry {}", i));
        }
        out.push(pointer_to_rom_offset(&data[start..end])?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_offsets() {
        let offset = 0x5054e;
        let ptr = rom_offset_to_pointer(offset);
        assert_eq!(pointer_to_rom_offset(&ptr).unwrap(), offset);
    }

    #[test]
    fn decodes_a_table() {
        let mut data = Vec::new();
        data.extend_from_slice(&rom_offset_to_pointer(HEADER_SIZE as u32 + 0x10));
        data.extend_from_slice(&rom_offset_to_pointer(HEADER_SIZE as u32 + 0x20));
        let table = decode_pointer_table(&data, 2).unwrap();
        assert_eq!(table, vec![HEADER_SIZE as u32 + 0x10, HEADER_SIZE as u32 + 0x20]);
    }

    #[test]
    fn rejects_below_base() {
        let data = [0x00, 0x00];
        assert!(pointer_to_rom_offset(&data).is_err());
    }
}
