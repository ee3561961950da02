use std::fs;
use std::path::PathBuf;

use failure::Error;
use serde::Serialize;
use structopt::StructOpt;

use zora_rom::{DataTable, Location};

#[derive(StructOpt, Debug)]
pub(crate) struct LocationsOpt {
    #[structopt(long, parse(from_os_str))]
    rom: PathBuf,

    #[structopt(long, parse(from_os_str), default_value = "locations.json")]
    out: PathBuf,
}

#[derive(Serialize)]
struct LocationEntry {
    location: String,
    item: String,
}

pub(crate) fn command(opt: &LocationsOpt) -> Result<(), Error> {
    let data = fs::read(&opt.rom)?;
    let table = DataTable::new(&data)?;

    let mut entries = Vec::new();
    for &loc in table.locations() {
        let item = table
            .get_item(&loc)
            .map(|i| i.to_string())
            .unwrap_or_else(|| "<none>".to_string());
        entries.push(LocationEntry {
            location: describe(&loc),
            item,
        });
    }

    let f = fs::File::create(&opt.out)?;
    serde_json::to_writer_pretty(f, &entries)?;
    println!("wrote {} location(s) to {}", entries.len(), opt.out.display());

    Ok(())
}

fn describe(loc: &Location) -> String {
    match loc {
        Location::OverworldCave { screen_id, slot_index } => {
            format!("overworld cave {:#04x} slot {}", screen_id, slot_index)
        }
        Location::DungeonRoom { level, room_id } => {
            format!("level {} room {:#04x}", level, room_id)
        }
        Location::ArmosSlot => "armos knight".to_string(),
        Location::CoastSlot => "coast".to_string(),
        Location::ShopSlot { shop_id, slot_index } => {
            format!("shop {} slot {}", shop_id, slot_index)
        }
    }
}
