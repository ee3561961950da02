use std::collections::HashMap;

use failure::{format_err, Error};
use lazy_static::lazy_static;

/// Total size of the base image (spec.md §6: a 131,088-byte file).
pub const IMAGE_SIZE: usize = 131_088;

/// Fixed header at the front of the image. MUST NOT be written by any patch
/// (spec.md §3 Invariant 4).
pub const HEADER_SIZE: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Region {
    NA,
    EU,
    Unknown,
}

pub struct RomInfo {
    pub md5_hash: String,
    pub known: bool,
    pub desc: String,
    pub region: Region,
}

#[derive(Clone, Copy, Debug)]
struct DbEntry {
    desc: &'static str,
    region: Region,
}

impl Default for DbEntry {
    fn default() -> Self {
        Self {
            desc: "Unrecognized base image",
            region: Region::Unknown,
        }
    }
}

lazy_static! {
    static ref KNOWN_IMAGES: HashMap<String, DbEntry> = {
        let mut images = HashMap::new();
        // Digest of the single documented base image this crate supports.
        // A real deployment populates this with the md5 of that cartridge
        // dump; left as a placeholder here since no image ships in the repo.
        images.insert(
            "d41d8cd98f00b204e9800998ecf8427e".to_string(),
            DbEntry {
                desc: "base image (NA)",
                region: Region::NA,
            },
        );
        images
    };
}

/// Validate `data` against the base-image contract (spec.md §6): exact
/// length, and (if recognized) a known md5 digest. A length mismatch is
/// `InvalidBaseImage` (fatal, spec.md §7); an unrecognized-but-correctly
/// sized image is not itself an error — callers decide whether
/// `known == false` should be fatal.
pub fn verify(data: &[u8]) -> Result<RomInfo, Error> {
    if data.len() != IMAGE_SIZE {
        return Err(format_err!(
            "base image size ({}) does not match the expected size ({})",
            data.len(),
            IMAGE_SIZE
        ));
    }

    let digest = md5::compute(data);
    let md5_hash = format!("{:x}", digest);

    let db_entry = KNOWN_IMAGES.get(&md5_hash).map_or(Default::default(), |o| *o);
    let known = KNOWN_IMAGES.contains_key(&md5_hash);

    Ok(RomInfo {
        md5_hash,
        known,
        desc: db_entry.desc.into(),
        region: db_entry.region,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_size() {
        let data = vec![0u8; IMAGE_SIZE - 1];
        assert!(verify(&data).is_err());
    }

    #[test]
    fn accepts_right_size_even_if_unknown() {
        let data = vec![0u8; IMAGE_SIZE];
        let info = verify(&data).unwrap();
        assert!(!info.known);
        assert_eq!(info.region, Region::Unknown);
    }
}
