use assert_cmd::cargo_bin;
use std::process::Command;

mod common;

#[test]
fn test_large_ledger_across_workers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("large_ledger.csv");
    common::generate_ledger(&path, 5_000, 4).expect("Failed to generate ledger");

    let output = Command::new(cargo_bin!("loanbook"))
        .arg(&path)
        .arg("--workers")
        .arg("8")
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "Binary failed to process ledger");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows: Vec<&str> = stdout.lines().skip(1).collect();
    assert_eq!(rows.len(), 5_000);
    assert!(
        rows.iter()
            .all(|row| row.ends_with(",1000000,0.1,50,22000,1012000,4,active,false"))
    );
}
