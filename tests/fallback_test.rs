use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

use common::{ACCOUNT_A, movements_file, seed_accounts_file};

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let accounts = seed_accounts_file();
    let movements = movements_file(&[format!("{ACCOUNT_A}, credit, 50.00, , k1")]);

    let mut cmd = Command::new(cargo_bin!("bank-ledger"));
    cmd.arg(movements.path())
        .arg("--accounts")
        .arg(accounts.path())
        .arg("--db-path")
        .arg("some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let accounts = seed_accounts_file();
    let movements = movements_file(&[format!("{ACCOUNT_A}, credit, 50.00, , k1")]);

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("bank-ledger"));
    cmd.arg(movements.path())
        .arg("--accounts")
        .arg(accounts.path())
        .arg("--db-path")
        .arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING").not());
}
