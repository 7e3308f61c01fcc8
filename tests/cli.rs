//! End-to-end tests for the keydiff binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn keydiff() -> Command {
    Command::cargo_bin("keydiff").unwrap()
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn prices(dir: &TempDir) -> (PathBuf, PathBuf) {
    let a = write_file(dir, "a.csv", "id,price\n1,100\n2,200\n3,300\n");
    let b = write_file(dir, "b.csv", "id,price\n2,200\n3,250\n4,400\n");
    (a, b)
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_diff_terminal() {
    let dir = TempDir::new().unwrap();
    let (a, b) = prices(&dir);

    keydiff()
        .args(["diff", arg(&a), arg(&b), "--key", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows in A only: 1"))
        .stdout(predicate::str::contains("Rows in B only: 1"))
        .stdout(predicate::str::contains("Changed — price (1 rows):"));
}

#[test]
fn test_diff_exit_code() {
    let dir = TempDir::new().unwrap();
    let (a, b) = prices(&dir);

    keydiff()
        .args(["diff", arg(&a), arg(&b), "--key", "id", "--exit-code"])
        .assert()
        .code(1);

    keydiff()
        .args(["diff", arg(&a), arg(&a), "--key", "id", "--exit-code"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No differences found."));
}

#[test]
fn test_diff_tolerance() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.csv", "id,price\n1,1.000\n");
    let b = write_file(&dir, "b.csv", "id,price\n1,1.005\n");

    keydiff()
        .args(["diff", arg(&a), arg(&b), "--key", "id", "--abs-tol", "0.01", "--exit-code"])
        .assert()
        .success();

    keydiff()
        .args(["diff", arg(&a), arg(&b), "--key", "id", "--abs-tol", "0.001", "--exit-code"])
        .assert()
        .code(1);
}

#[test]
fn test_diff_relative_tolerance() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.csv", "id,price\n1,100\n2,100\n");
    let b = write_file(&dir, "b.csv", "id,price\n1,109\n2,120\n");

    let output = keydiff()
        .args(["diff", arg(&a), arg(&b), "--key", "id", "--rel-tol", "0.1", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["stats"]["mismatched_keys"], 1);
    assert_eq!(value["changed"][0]["rows"][0]["id"], 2);

    keydiff()
        .args(["diff", arg(&a), arg(&b), "--key", "id", "--rel-tol", "0.2", "--exit-code"])
        .assert()
        .success();
}

#[test]
fn test_diff_json() {
    let dir = TempDir::new().unwrap();
    let (a, b) = prices(&dir);

    let output = keydiff()
        .args(["diff", arg(&a), arg(&b), "--key", "id", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["stats"]["matched_keys"], 2);
    assert_eq!(value["changed"][0]["rows"][0]["price_b"], 250);
}

#[test]
fn test_diff_html_report() {
    let dir = TempDir::new().unwrap();
    let (a, b) = prices(&dir);
    let report = dir.path().join("report.html");

    keydiff()
        .args(["diff", arg(&a), arg(&b), "--key", "id", "--out", arg(&report)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let html = fs::read_to_string(&report).unwrap();
    assert!(html.contains("Only in A"));
    assert!(html.contains("Only in B"));
    assert!(html.contains("Changed — price"));
}

#[test]
fn test_diff_out_conflicts_with_format() {
    let dir = TempDir::new().unwrap();
    let (a, b) = prices(&dir);
    let report = dir.path().join("report.html");

    keydiff()
        .args(["diff", arg(&a), arg(&b), "--key", "id", "--out", arg(&report), "--format", "json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));

    assert!(!report.exists());
}

#[test]
fn test_diff_missing_file() {
    let dir = TempDir::new().unwrap();
    let (a, _) = prices(&dir);
    let missing = dir.path().join("missing.csv");

    keydiff()
        .args(["diff", arg(&a), arg(&missing), "--key", "id"])
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn test_diff_missing_key() {
    let dir = TempDir::new().unwrap();
    let (a, b) = prices(&dir);

    keydiff()
        .args(["diff", arg(&a), arg(&b), "--key", "sku"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("key column 'sku' not found"));
}

#[test]
fn test_diff_negative_tolerance() {
    let dir = TempDir::new().unwrap();
    let (a, b) = prices(&dir);

    keydiff()
        .args(["diff", arg(&a), arg(&b), "--key", "id", "--rel-tol=-1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid tolerance"));
}

#[test]
fn test_version() {
    keydiff()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!("keydiff {}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_duplicates() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "d.csv", "id,city\n1,NY\n1,SF\n2,LA\n2,LA\n2,NY\n");

    keydiff()
        .args(["duplicates", arg(&file), "--column", "id", "--counts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("count"))
        .stdout(predicate::str::contains("3"));

    keydiff()
        .args(["duplicates", arg(&file), "--column", "id,city"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 duplicate row(s)"));
}

#[test]
fn test_audit() {
    let dir = TempDir::new().unwrap();
    let file = write_file(
        &dir,
        "q.csv",
        "id,amount,day\n1,10,2024-01-01\n2,,01/02/2024\n3,abc,2024-01-03\n",
    );

    let output = keydiff()
        .args([
            "audit",
            arg(&file),
            "--not-null",
            "amount",
            "--expect",
            "amount=integer",
            "--date-format",
            "day=%Y-%m-%d",
            "--no-infer",
            "--format",
            "json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rules: Vec<&str> = value["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["rule"].as_str().unwrap())
        .collect();
    assert_eq!(rules, vec!["null_forbidden", "dtype_mismatch", "invalid_date_format"]);
}

#[test]
fn test_expect() {
    let dir = TempDir::new().unwrap();
    let file = write_file(
        &dir,
        "orders.csv",
        "order_id,status,code,amount\n1,open,AB12,10.0\n2,closed,ZZ99,0.0\n2,lost,bad,-5.0\n",
    );

    let output = keydiff()
        .args([
            "expect",
            arg(&file),
            "--unique",
            "order_id",
            "--allowed",
            "status=open|closed",
            "--pattern",
            r"code=[A-Z]{2}\d{2}",
            "--rule",
            "amount >= 0",
            "--format",
            "json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["passed"], false);
    let failed: Vec<&str> = value["column_results"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["passed"] == false)
        .map(|r| r["column"].as_str().unwrap())
        .collect();
    assert_eq!(failed, vec!["order_id", "status", "code"]);
    assert_eq!(value["row_results"][0]["failing_rows"], serde_json::json!([2]));

    keydiff()
        .args(["expect", arg(&file), "--not-null", "status", "--exit-code"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Expectation report: PASSED"));

    keydiff()
        .args(["expect", arg(&file), "--unique", "order_id", "--exit-code"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("- order_id: FAIL -> expected unique values"));
}

#[test]
fn test_expect_invalid_rule() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "t.csv", "id\n1\n");

    keydiff()
        .args(["expect", arg(&file), "--rule", "id"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid row rule 'id'"));
}

#[test]
fn test_trim() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "t.csv", "id,name\n1, Alice \n2,Bob\n");
    let out = dir.path().join("trimmed.csv");

    keydiff()
        .args(["trim", arg(&file), "--out", arg(&out)])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&out).unwrap(), "id,name\n1,Alice\n2,Bob\n");
}
