//! The interactive shell: prompt, line dispatch, and result printing.
//!
//! User input errors are printed and the loop keeps going; storage errors
//! propagate out so the process can report them and stop.

pub mod command;

use std::io::{self, BufRead, Write};

use crate::repl::command::{prepare_statement, MetaCommand, PrepareError, Statement};
use crate::storage::layout::{
    COMMON_NODE_HEADER_SIZE, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_SPACE_FOR_CELLS,
};
use crate::storage::table::Table;
use crate::types::error::{DatabaseError, Result};
use crate::types::row::ROW_SIZE;

const PROMPT: &str = "lyt-db> ";

/// Run the shell until `.exit` or end of input. The caller closes the
/// table afterwards, so both exits flush.
pub fn run(table: &mut Table) -> Result<()> {
    let stdin = io::stdin();
    let mut input = String::new();

    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            // End of input counts as a quiet `.exit`.
            return Ok(());
        }
        let line = input.trim_end_matches(['\n', '\r']);

        if line.is_empty() {
            continue;
        }

        if line.starts_with('.') {
            match MetaCommand::parse(line) {
                Some(MetaCommand::Exit) => return Ok(()),
                Some(MetaCommand::Btree) => {
                    println!("tree:");
                    print!("{}", table.render_tree()?);
                }
                Some(MetaCommand::Constants) => {
                    println!("constants:");
                    print_constants();
                }
                Some(MetaCommand::Help) => print_help(),
                None => eprintln!(
                    "unrecognized meta command '{line}'. use '.help' for a list of supported meta commands."
                ),
            }
            continue;
        }

        match prepare_statement(line) {
            Ok(statement) => execute_statement(table, statement)?,
            Err(e @ PrepareError::SyntaxError) => eprintln!("{e}"),
            Err(e) => println!("{e}"),
        }
    }
}

fn execute_statement(table: &mut Table, statement: Statement) -> Result<()> {
    match statement {
        Statement::Insert(row) => match table.insert(&row) {
            Ok(()) => println!("executed."),
            Err(DatabaseError::DuplicateKey(_)) => println!("error: duplicate key."),
            Err(e) => return Err(e),
        },
        Statement::Select => {
            for row in table.select_all()? {
                println!("{row}");
            }
            println!("executed.");
        }
    }
    Ok(())
}

fn print_constants() {
    println!("ROW_SIZE: {ROW_SIZE}");
    println!("COMMON_NODE_HEADER_SIZE: {COMMON_NODE_HEADER_SIZE}");
    println!("LEAF_NODE_HEADER_SIZE: {LEAF_NODE_HEADER_SIZE}");
    println!("LEAF_NODE_CELL_SIZE: {LEAF_NODE_CELL_SIZE}");
    println!("LEAF_NODE_SPACE_FOR_CELLS: {LEAF_NODE_SPACE_FOR_CELLS}");
    println!("LEAF_NODE_MAX_CELLS: {LEAF_NODE_MAX_CELLS}");
}

fn print_help() {
    println!("SQL commands supported:");
    println!("\tinsert <id> <username> <email> insert a new row into the database. That is the currently supported schema.");
    println!("\tselect                         select all rows from the database.");
    println!();
    println!("\tNOTE: all SQL commands should be in lower case.");
    println!();
    println!("database meta-commands:");
    println!("\t.exit      exit the db.");
    println!("\t.btree     print the current b-tree structure for the database.");
    println!("\t.constants print the constants of the db file format, for debugging purposes.");
    println!("\t.help      print this help message.");
}
