#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

use sqlyte::types::row::Row;

/// A database file inside a temp directory that disappears with the
/// test. The directory handle must stay alive as long as the path is
/// used.
pub struct TempDb {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TempDb {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("test.db");
        TempDb { dir, path }
    }
}

pub fn sample_row(id: u32) -> Row {
    Row::new(id, &format!("user{id}"), &format!("person{id}@example.com"))
        .expect("sample row fits the schema")
}
