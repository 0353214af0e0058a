use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("loanbook"));
    cmd.arg("tests/fixtures/ledger.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "loan,principal,rate,installments,installment_amount,outstanding,payments,status,delinquent",
        ))
        // Third loan001 payment is not a full installment and is rejected
        .stdout(predicate::str::contains(
            "loan001,1000000,0.1,50,22000,1056000,2,active,false",
        ))
        .stdout(predicate::str::contains(
            "loan002,500000,0.05,25,21000,504000,1,active,false",
        ))
        .stderr(predicate::str::contains("Error processing ledger entry"))
        .stderr(predicate::str::contains("must be equal to the weekly payment"));

    Ok(())
}

#[test]
fn test_cli_output_is_sorted_by_loan() {
    let output = Command::new(cargo_bin!("loanbook"))
        .arg("tests/fixtures/ledger.csv")
        .arg("--workers")
        .arg("1")
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let ids: Vec<&str> = stdout
        .lines()
        .skip(1)
        .filter_map(|line| line.split(',').next())
        .collect();
    assert_eq!(ids, ["loan001", "loan002"]);
}

#[test]
fn test_cli_json_output() {
    let output = Command::new(cargo_bin!("loanbook"))
        .arg("tests/fixtures/ledger.csv")
        .arg("--format")
        .arg("json")
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let book: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let loans = book.as_array().expect("loan book should be an array");
    assert_eq!(loans.len(), 2);
    assert_eq!(loans[0]["loan"], "loan001");
    assert_eq!(loans[0]["outstanding"], "1056000");
    assert_eq!(loans[1]["installment_amount"], "21000");
}

#[test]
fn test_cli_missing_input_fails() {
    let mut cmd = Command::new(cargo_bin!("loanbook"));
    cmd.arg("tests/fixtures/does_not_exist.csv");

    cmd.assert().failure();
}
