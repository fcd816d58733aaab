use thiserror::Error;

use crate::types::PageNum;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("db file is not a whole number of pages, corrupt database file")]
    CorruptFile,

    #[error("tried to fetch a page out of bounds ({page_num} >= {max})")]
    PageOutOfBounds { page_num: PageNum, max: PageNum },

    #[error("tried to flush a page that was never loaded (page {0})")]
    PageNotLoaded(PageNum),

    #[error("duplicate key {0}")]
    DuplicateKey(u32),

    #[error("string value exceeds column capacity")]
    StringTooLong,

    #[error("unknown node type tag {0}")]
    UnknownNodeType(u8),

    #[error("internal node {page_num} holds an invalid child pointer")]
    InvalidChild { page_num: PageNum },
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
