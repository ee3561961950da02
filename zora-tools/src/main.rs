use failure::Error;
use structopt::StructOpt;

mod doc;
mod flagstring;
mod info;
mod locations;

#[derive(StructOpt, Debug)]
enum Opt {
    Doc(doc::DocOpt),
    Flagstring(flagstring::FlagstringOpt),
    Info(info::InfoOpt),
    Locations(locations::LocationsOpt),
}

fn main() -> Result<(), Error> {
    let opt = Opt::from_args();
    match &opt {
        Opt::Doc(doc_opt) => doc::command(doc_opt),
        Opt::Flagstring(flagstring_opt) => flagstring::command(flagstring_opt),
        Opt::Info(info_opt) => info::command(info_opt),
        Opt::Locations(locations_opt) => locations::command(locations_opt),
    }
}
