#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

fn run_catalog(db_path: &std::path::Path, rows: &[&str]) -> String {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "sku,name,category,price,stock").unwrap();
    for row in rows {
        writeln!(csv, "{row}").unwrap();
    }

    let output = Command::new(cargo_bin!("procura"))
        .arg("catalog")
        .arg(csv.path())
        .arg("--supplier")
        .arg("sales@acme.test")
        .arg("--db-path")
        .arg(db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let first = run_catalog(&db_path, &["GL-1,Gloves,Medical,2.00,10"]);
    assert!(first.contains("GL-1,Gloves,Medical,2,10,sales@acme.test"));

    // Same supplier and category are found again; GL-1 is restocked in place.
    let second = run_catalog(
        &db_path,
        &["GL-1,Gloves,Medical,2.00,25", "MS-1,Masks,Medical,0.50,100"],
    );
    assert!(second.contains("GL-1,Gloves,Medical,2,25,sales@acme.test"));
    assert!(second.contains("MS-1,Masks,Medical,0.5,100,sales@acme.test"));
    assert_eq!(second.lines().count(), 3);
}
