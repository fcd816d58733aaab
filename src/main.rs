use std::env;
use std::process;

use sqlyte::repl;
use sqlyte::storage::table::Table;
use sqlyte::types::error::Result;

fn main() {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| String::from("sqlyte"));

    let Some(path) = args.next() else {
        println!("you must supply a database filename.");
        println!("usage: {program} <db_file>");
        process::exit(1);
    };

    if let Err(e) = run(&path) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(path: &str) -> Result<()> {
    let mut table = Table::open(path)?;
    repl::run(&mut table)?;
    table.close()
}
