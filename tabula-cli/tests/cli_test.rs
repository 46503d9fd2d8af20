use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn data_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for dataset in ["066_IBM", "071_COL"] {
        let dataset_dir = dir.path().join(dataset);
        std::fs::create_dir(&dataset_dir).unwrap();
        let mut sample = std::fs::File::create(dataset_dir.join("sample.csv")).unwrap();
        writeln!(sample, "age,city\n34,NY\n29,LA").unwrap();
    }
    dir
}

#[test]
fn datasets_lists_loaded_names() {
    let dir = data_dir();
    Command::cargo_bin("tabula")
        .unwrap()
        .args(["--data-dir", dir.path().to_str().unwrap(), "datasets"])
        .assert()
        .success()
        .stdout(predicate::str::contains("066_IBM"))
        .stdout(predicate::str::contains("071_COL"));
}

#[test]
fn unknown_strategy_is_rejected() {
    let dir = data_dir();
    Command::cargo_bin("tabula")
        .unwrap()
        .args([
            "--data-dir",
            dir.path().to_str().unwrap(),
            "--strategy",
            "telepathy",
            "ask",
            "066_IBM",
            "How many rows?",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown strategy"));
}

#[test]
fn unknown_variant_is_rejected() {
    let dir = data_dir();
    Command::cargo_bin("tabula")
        .unwrap()
        .args([
            "--data-dir",
            dir.path().to_str().unwrap(),
            "--variant",
            "everything",
            "datasets",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown variant"));
}

#[test]
fn missing_data_dir_fails() {
    Command::cargo_bin("tabula")
        .unwrap()
        .args(["--data-dir", "/definitely/not/here", "datasets"])
        .assert()
        .failure();
}
