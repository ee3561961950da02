use std::fs::File;
use std::io::prelude::*;
use std::path::PathBuf;

use failure::Error;
use structopt::StructOpt;

use zora_core::flags::{Category, FLAG_REGISTRY};

#[derive(StructOpt, Debug)]
pub(crate) struct DocOpt {
    #[structopt(long, parse(from_os_str), default_value = "out")]
    outdir: PathBuf,
}

fn category_name(c: Category) -> &'static str {
    match c {
        Category::ItemShuffle => "Item Shuffle",
        Category::DungeonShuffle => "Dungeon Shuffle",
        Category::Overworld => "Overworld",
        Category::Convenience => "Convenience",
        Category::Gameplay => "Gameplay",
        Category::Aesthetic => "Aesthetic",
        Category::Hints => "Hints",
        Category::Legacy => "Legacy",
        Category::Hidden => "Hidden",
    }
}

const CATEGORIES: &[Category] = &[
    Category::ItemShuffle,
    Category::DungeonShuffle,
    Category::Overworld,
    Category::Convenience,
    Category::Gameplay,
    Category::Aesthetic,
    Category::Hints,
    Category::Legacy,
    Category::Hidden,
];

pub(crate) fn command(opt: &DocOpt) -> Result<(), Error> {
    std::fs::create_dir_all(&opt.outdir)?;
    let mut path = opt.outdir.clone();
    path.push("flags.md");
    let mut f = File::create(path)?;

    writeln!(f, "# Flag Reference\n")?;

    for &category in CATEGORIES {
        let defs: Vec<_> = FLAG_REGISTRY.iter().filter(|d| d.category == category).collect();
        if defs.is_empty() {
            continue;
        }

        writeln!(f, "## {}\n", category_name(category))?;
        writeln!(f, "| key | name | help |")?;
        writeln!(f, "|-----|------|------|")?;
        for def in defs {
            writeln!(f, "| `{}` | {} | {} |", def.key, def.name, def.help)?;
        }
        writeln!(f)?;
    }

    println!("wrote {}", opt.outdir.join("flags.md").display());
    Ok(())
}
