//! User-facing randomizer binary (spec.md §6 CLI surface).
//!
//! Reads a base image and a flagstring, calls `zora_core::generate`, and
//! writes the patched image. Continues `rando-cli/src/main.rs`'s
//! read-call-write shape; argument parsing is `structopt` as before, with
//! `--type` replaced by `--flagstring` and exit codes added per §6/§7.

use std::fs;
use std::path::PathBuf;
use std::process;

use failure::Error;
use rand::Rng;
use structopt::StructOpt;

use zora_core::error::ZoraError;
use zora_core::flags::Flags;

#[derive(StructOpt, Debug)]
#[structopt(name = "zora")]
struct Opt {
    #[structopt(long)]
    seed: Option<u64>,

    #[structopt(long, default_value = "")]
    flagstring: String,

    #[structopt(long, parse(from_os_str))]
    input_file: PathBuf,

    #[structopt(long, parse(from_os_str), default_value = ".")]
    output_dir: PathBuf,

    #[structopt(long, default_value = "info")]
    loglevel: String,
}

fn run(opt: Opt) -> Result<(), Error> {
    let level = opt
        .loglevel
        .parse()
        .map_err(|_| failure::format_err!("unrecognized loglevel '{}'", opt.loglevel))?;
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let flags = Flags::decode(&opt.flagstring)
        .map_err(|e| ZoraError::InvalidFlagstring(e.to_string()))?;

    let seed = opt.seed.unwrap_or_else(|| rand::thread_rng().gen());

    let base_image = fs::read(&opt.input_file)?;
    let game = zora_core::generate(seed, &flags, &base_image)?;

    fs::create_dir_all(&opt.output_dir)?;
    let out_path = opt
        .output_dir
        .join(format!("zora-{}.rom", game.seed_display));
    fs::write(&out_path, &game.data)?;

    log::info!(
        "wrote {} (seed {}, patch hash {:#x})",
        out_path.display(),
        game.seed_display,
        game.patch_hash
    );

    Ok(())
}

fn main() {
    let opt = Opt::from_args();
    if let Err(err) = run(opt) {
        eprintln!("error: {}", err);
        let code = err
            .downcast_ref::<ZoraError>()
            .map(ZoraError::exit_code)
            .unwrap_or(5);
        process::exit(code);
    }
}
