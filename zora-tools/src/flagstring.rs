use failure::Error;
use structopt::StructOpt;

use zora_core::flags::Flags;

#[derive(StructOpt, Debug)]
pub(crate) enum FlagstringOpt {
    /// Decode a flagstring and print every flag it sets.
    Decode { flagstring: String },
    /// Round-trip a flagstring through decode/encode and report whether it matches.
    Check { flagstring: String },
}

pub(crate) fn command(opt: &FlagstringOpt) -> Result<(), Error> {
    match opt {
        FlagstringOpt::Decode { flagstring } => {
            let flags = Flags::decode(flagstring)?;
            for def in zora_core::flags::FLAG_REGISTRY.iter() {
                if flags.is_set(def.key) {
                    println!("{:<45} {}", def.key, def.name);
                }
            }
        }
        FlagstringOpt::Check { flagstring } => {
            let flags = Flags::decode(flagstring)?;
            let re_encoded = flags.encode();
            if &re_encoded == flagstring {
                println!("round-trip ok: {}", re_encoded);
            } else {
                println!(
                    "round-trip MISMATCH: input {} re-encoded as {}",
                    flagstring, re_encoded
                );
            }
        }
    }
    Ok(())
}
