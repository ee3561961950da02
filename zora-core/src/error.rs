//! Re-exports the shared error taxonomy (spec.md §7). The enum itself lives
//! in `zora_rom::error` so that `memmap::check_writable` (C2) can construct
//! `OutOfRegion` directly, without `zora-rom` depending back on this crate.

pub use zora_rom::error::ZoraError;
