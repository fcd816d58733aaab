mod common;

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use common::TempDb;

fn run_script(db_path: &Path, commands: &[&str]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sqlyte"))
        .arg(db_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn sqlyte");

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        for command in commands {
            stdin
                .write_all(format!("{command}\n").as_bytes())
                .expect("failed to write to stdin");
        }
    }

    child.wait_with_output().expect("failed to wait for sqlyte")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn missing_database_argument_exits_with_usage() {
    let output = Command::new(env!("CARGO_BIN_EXE_sqlyte"))
        .output()
        .expect("failed to spawn sqlyte");

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).starts_with("you must supply a database filename.\n"));
}

#[test]
fn inserts_and_retrieves_a_row() {
    let db = TempDb::new();
    let output = run_script(
        &db.path,
        &["insert 1 user1 person1@example.com", "select", ".exit"],
    );

    assert!(output.status.success());
    assert_eq!(
        stdout_of(&output),
        "lyt-db> executed.\n\
         lyt-db> ( 1, user1, person1@example.com )\n\
         executed.\n\
         lyt-db> "
    );
}

#[test]
fn accepts_maximum_length_strings() {
    let db = TempDb::new();
    let username = "w".repeat(32);
    let email = "w".repeat(255);
    let insert = format!("insert 1 {username} {email}");
    let output = run_script(&db.path, &[&insert, "select", ".exit"]);

    assert_eq!(
        stdout_of(&output),
        format!(
            "lyt-db> executed.\nlyt-db> ( 1, {username}, {email} )\nexecuted.\nlyt-db> "
        )
    );
}

#[test]
fn rejects_a_negative_id() {
    let db = TempDb::new();
    let output = run_script(&db.path, &["insert -1 nobody foo@bar.com", "select", ".exit"]);

    assert_eq!(
        stdout_of(&output),
        "lyt-db> id must be non-negative.\nlyt-db> executed.\nlyt-db> "
    );
}

#[test]
fn rejects_over_long_strings() {
    let db = TempDb::new();
    let username = "a".repeat(33);
    let insert = format!("insert 1 {username} a@b.com");
    let output = run_script(&db.path, &[&insert, "select", ".exit"]);

    assert_eq!(
        stdout_of(&output),
        "lyt-db> string is too long.\nlyt-db> executed.\nlyt-db> "
    );
}

#[test]
fn rejects_a_duplicate_key() {
    let db = TempDb::new();
    let output = run_script(
        &db.path,
        &[
            "insert 1 user1 person1@example.com",
            "insert 1 user1 person1@example.com",
            "select",
            ".exit",
        ],
    );

    assert_eq!(
        stdout_of(&output),
        "lyt-db> executed.\n\
         lyt-db> error: duplicate key.\n\
         lyt-db> ( 1, user1, person1@example.com )\n\
         executed.\n\
         lyt-db> "
    );
}

#[test]
fn syntax_errors_go_to_stderr_and_the_shell_continues() {
    let db = TempDb::new();
    let output = run_script(&db.path, &["insert 1 user1", "select", ".exit"]);

    assert_eq!(stdout_of(&output), "lyt-db> lyt-db> executed.\nlyt-db> ");
    assert_eq!(
        stderr_of(&output),
        "syntax error. could not parse statement.\n"
    );
}

#[test]
fn unrecognized_meta_command_goes_to_stderr() {
    let db = TempDb::new();
    let output = run_script(&db.path, &[".nope", ".exit"]);

    assert_eq!(stdout_of(&output), "lyt-db> lyt-db> ");
    assert_eq!(
        stderr_of(&output),
        "unrecognized meta command '.nope'. use '.help' for a list of supported meta commands.\n"
    );
}

#[test]
fn rows_persist_across_sessions() {
    let db = TempDb::new();

    let first = run_script(
        &db.path,
        &[
            "insert 1 user1 person1@example.com",
            "insert 2 user2 person2@example.com",
            "insert 3 user3 person3@example.com",
            ".exit",
        ],
    );
    assert!(first.status.success());

    let second = run_script(&db.path, &["select", ".exit"]);
    assert_eq!(
        stdout_of(&second),
        "lyt-db> ( 1, user1, person1@example.com )\n\
         ( 2, user2, person2@example.com )\n\
         ( 3, user3, person3@example.com )\n\
         executed.\n\
         lyt-db> "
    );
}

#[test]
fn end_of_input_flushes_like_exit() {
    let db = TempDb::new();

    // No .exit: the pipe just closes after the insert.
    let first = run_script(&db.path, &["insert 1 user1 person1@example.com"]);
    assert!(first.status.success());

    let second = run_script(&db.path, &["select", ".exit"]);
    assert_eq!(
        stdout_of(&second),
        "lyt-db> ( 1, user1, person1@example.com )\nexecuted.\nlyt-db> "
    );
}

#[test]
fn btree_dump_shows_a_three_node_tree() {
    let db = TempDb::new();
    let inserts: Vec<String> = (1..=14)
        .map(|i| format!("insert {i} user{i} person{i}@example.com"))
        .collect();
    let mut commands: Vec<&str> = inserts.iter().map(String::as_str).collect();
    commands.push(".btree");
    commands.push(".exit");

    let output = run_script(&db.path, &commands);

    let mut expected = String::new();
    for _ in 1..=14 {
        expected.push_str("lyt-db> executed.\n");
    }
    expected.push_str("lyt-db> tree:\n- internal (size 1)\n  - leaf (size 7)\n");
    for i in 1..=7 {
        expected.push_str(&format!("    - {i}\n"));
    }
    expected.push_str("  - key 7\n  - leaf (size 7)\n");
    for i in 8..=14 {
        expected.push_str(&format!("    - {i}\n"));
    }
    expected.push_str("lyt-db> ");

    assert_eq!(stdout_of(&output), expected);
}

#[test]
fn multi_level_scan_returns_ascending_order() {
    let db = TempDb::new();
    let order = [
        18u32, 7, 10, 29, 23, 4, 14, 30, 15, 26, 22, 19, 2, 1, 21, 11, 6, 20, 5, 8, 9, 3, 12, 27,
        17, 16, 13, 24, 25, 28,
    ];
    let inserts: Vec<String> = order
        .iter()
        .map(|i| format!("insert {i} user{i} person{i}@example.com"))
        .collect();
    let mut commands: Vec<&str> = inserts.iter().map(String::as_str).collect();
    commands.push("select");
    commands.push(".exit");

    let output = run_script(&db.path, &commands);

    let mut expected = String::new();
    for _ in 0..order.len() {
        expected.push_str("lyt-db> executed.\n");
    }
    expected.push_str("lyt-db> ");
    for i in 1..=30 {
        expected.push_str(&format!("( {i}, user{i}, person{i}@example.com )\n"));
    }
    expected.push_str("executed.\nlyt-db> ");

    assert_eq!(stdout_of(&output), expected);
}

#[test]
fn constants_snapshot() {
    let db = TempDb::new();
    let output = run_script(&db.path, &[".constants", ".exit"]);

    assert_eq!(
        stdout_of(&output),
        "lyt-db> constants:\n\
         ROW_SIZE: 293\n\
         COMMON_NODE_HEADER_SIZE: 6\n\
         LEAF_NODE_HEADER_SIZE: 14\n\
         LEAF_NODE_CELL_SIZE: 297\n\
         LEAF_NODE_SPACE_FOR_CELLS: 4082\n\
         LEAF_NODE_MAX_CELLS: 13\n\
         lyt-db> "
    );
}

#[test]
fn help_lists_supported_commands() {
    let db = TempDb::new();
    let output = run_script(&db.path, &[".help", ".exit"]);

    let stdout = stdout_of(&output);
    assert!(stdout.contains("SQL commands supported:"));
    assert!(stdout.contains("database meta-commands:"));
    assert!(stdout.contains(".btree"));
    assert!(stdout.contains(".constants"));
}
