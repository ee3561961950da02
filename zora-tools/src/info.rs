use std::fs::File;
use std::io::prelude::*;
use std::path::PathBuf;

use failure::Error;
use structopt::StructOpt;

use zora_rom::verify;

#[derive(StructOpt, Debug)]
pub(crate) struct InfoOpt {
    #[structopt(long, parse(from_os_str))]
    rom: PathBuf,
}

pub(crate) fn command(opt: &InfoOpt) -> Result<(), Error> {
    let mut f = File::open(&opt.rom)?;
    let mut buffer = Vec::new();
    // read the whole file
    f.read_to_end(&mut buffer)?;

    let info = verify::verify(&buffer)?;

    println!("Info for {}:", &opt.rom.display());
    println!("  Size:        {} bytes", buffer.len());
    println!("  MD5 hash:    {}", info.md5_hash);
    println!("  Known:       {}", info.known);
    println!("  Description: {}", info.desc);
    println!("  Region:      {:?}", info.region);

    Ok(())
}
