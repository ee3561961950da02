//! Base-image parsing, the declarative memory map, the item/location data
//! model, and the byte-exact patch engine (spec.md §4.2, §4.9, C2/C9).
//!
//! This crate owns everything the randomization core treats as "the world":
//! it never shuffles or validates anything itself (that's `zora-core`), it
//! only parses, mutates, and re-serializes.

pub mod error;
pub mod interval;
pub mod item;
pub mod location;
pub mod memmap;
pub mod patch;
pub mod roomcode;
pub mod slot;
pub mod util;
pub mod verify;
pub mod world;

pub use item::{Category, Item, ProgressiveClass, RupeeValue, Tier};
pub use location::Location;
pub use patch::Patch;
pub use verify::{verify, Region, RomInfo};
pub use world::DataTable;
