//! Randomization Core entry point (spec.md §2 data flow, §5 concurrency
//! model): `generate` is the single call a driver (the CLI) makes. It is
//! single-threaded and cooperative, runs to completion, and holds no
//! mutable state outside its own `DataTable` working copy (spec.md §5).
//! Grounded on `rando/src/lib.rs::randomize`'s "verify, transform, return"
//! shape, generalized from one fixed transform into the full
//! item-randomize → overworld-randomize → validate → retry loop.

pub mod error;
pub mod flags;
pub mod inventory;
pub mod item_randomizer;
pub mod overworld_randomizer;
pub mod rng;
pub mod solver;
pub mod validator;

use failure::Error;
use log::{info, warn};
use radix_fmt::radix_36;

use zora_rom::{verify, DataTable};

use crate::error::ZoraError;
use crate::flags::Flags;
use crate::rng::Rng;

/// A completed, validated generation: the patched image bytes plus the
/// metadata needed to report or re-derive the run.
pub struct RandomizedGame {
    pub seed: u64,
    pub seed_display: String,
    pub data: Vec<u8>,
    pub patch_hash: u64,
}

/// Retries C6+C8 together with a derived seed on an `Unbeatable` result
/// before surfacing (spec.md §7 policy: "validator and solver failures are
/// retriable within the randomizer").
const MAX_VALIDATION_RETRIES: u32 = 3;

/// Run one full generation: verify the base image, randomize items and the
/// overworld under `flags`, validate reachability, and emit the patched
/// image. Same `(seed, flags, base_image)` always produces byte-identical
/// output (spec.md §3 Invariant 5, §8 property 1).
pub fn generate(seed: u64, flags: &Flags, base_image: &[u8]) -> Result<RandomizedGame, Error> {
    let rom_info = verify::verify(base_image)
        .map_err(|e| ZoraError::InvalidBaseImage(e.to_string()))?;
    if !rom_info.known {
        return Err(ZoraError::InvalidBaseImage(format!(
            "unrecognized base image (md5 {})",
            rom_info.md5_hash
        ))
        .into());
    }

    let mut flags = flags.clone();
    flags.normalize_for_base(rom_info.known);

    let mut attempt = 0u32;
    let mut current_seed = seed;

    loop {
        let mut table = DataTable::new(base_image)?;
        let mut overworld_rng = Rng::from_seed(current_seed);

        item_randomizer::randomize_items(&mut table, &flags, current_seed)?;
        overworld_randomizer::randomize_overworld(&mut table, &flags, &mut overworld_rng)?;

        let result = validator::validate(&table, &flags);
        if result.beatable {
            let patch = table.drain_writes();
            let patch_hash = patch.hash();
            let data = patch.apply_to(base_image)?;
            info!(
                "seed {} ({:#}) generated a beatable world on attempt {}",
                current_seed,
                radix_36(current_seed),
                attempt
            );
            return Ok(RandomizedGame {
                seed: current_seed,
                seed_display: format!("{:#}", radix_36(current_seed)),
                data,
                patch_hash,
            });
        }

        warn!(
            "seed {} failed validation on attempt {}: missing {:?}",
            current_seed, attempt, result.missing_required_items
        );
        attempt += 1;
        if attempt > MAX_VALIDATION_RETRIES {
            return Err(ZoraError::Unbeatable {
                seed: current_seed,
                missing_count: result.missing_required_items.len(),
            }
            .into());
        }
        current_seed = Rng::derive_seed(seed, attempt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zora_rom::verify::IMAGE_SIZE;

    #[test]
    fn rejects_a_base_image_of_the_wrong_size() {
        let flags = Flags::new();
        let result = generate(1, &flags, &vec![0u8; IMAGE_SIZE - 1]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_an_unrecognized_base_image() {
        let flags = Flags::new();
        let result = generate(1, &flags, &vec![0u8; IMAGE_SIZE]);
        assert!(result.is_err());
    }
}
