use thiserror::Error;

use crate::types::row::Row;

/// A parsed SQL-ish statement, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Insert(Row),
    Select,
}

/// Dot-prefixed commands that control the shell rather than the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    Btree,
    Constants,
    Help,
}

impl MetaCommand {
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            ".exit" => Some(MetaCommand::Exit),
            ".btree" => Some(MetaCommand::Btree),
            ".constants" => Some(MetaCommand::Constants),
            ".help" => Some(MetaCommand::Help),
            _ => None,
        }
    }
}

/// Why an input line did not become a [`Statement`]. The `Display` texts
/// are the shell's user-facing messages, verbatim.
#[derive(Debug, Error, PartialEq)]
pub enum PrepareError {
    #[error("syntax error. could not parse statement.")]
    SyntaxError,

    #[error("id must be non-negative.")]
    NegativeId,

    #[error("string is too long.")]
    StringTooLong,

    #[error("unrecognized keyword at start of '{0}'. use '.help' for a list of supported SQL commands.")]
    UnrecognizedStatement(String),
}

pub fn prepare_statement(input: &str) -> Result<Statement, PrepareError> {
    if input.starts_with("insert") {
        prepare_insert(input)
    } else if input == "select" {
        Ok(Statement::Select)
    } else {
        Err(PrepareError::UnrecognizedStatement(input.to_string()))
    }
}

fn prepare_insert(input: &str) -> Result<Statement, PrepareError> {
    let mut parts = input.split_whitespace();
    parts.next(); // the "insert" keyword

    let (Some(id), Some(username), Some(email)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(PrepareError::SyntaxError);
    };

    let id: i64 = id.parse().map_err(|_| PrepareError::SyntaxError)?;
    if id < 0 {
        return Err(PrepareError::NegativeId);
    }
    let id = u32::try_from(id).map_err(|_| PrepareError::SyntaxError)?;

    let row = Row::new(id, username, email).map_err(|_| PrepareError::StringTooLong)?;
    Ok(Statement::Insert(row))
}
