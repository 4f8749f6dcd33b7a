use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn bombo_dash() -> Command {
    let mut cmd = Command::cargo_bin("bombo-dash").expect("binary is built");
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn summary_prints_formatted_headline_metrics() {
    bombo_dash()
        .arg("--no-progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("$70.0M"))
        .stdout(predicate::str::contains("801K"))
        .stdout(predicate::str::contains("not saved (use --save-html)"));
}

#[test]
fn writes_dashboard_and_linked_exports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let html = dir.path().join("dashboard.html");
    let series = dir.path().join("monthly.csv");
    let json = dir.path().join("data.json");

    bombo_dash()
        .arg("--no-progress")
        .arg("--no-minify")
        .arg("--save-html")
        .arg(&html)
        .arg("--save-series")
        .arg(&series)
        .arg("--save-json")
        .arg(&json)
        .assert()
        .success();

    let page = fs::read_to_string(&html).expect("dashboard written");
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("$9.4M"));
    assert!(page.contains("href=\"monthly.csv\""));
    assert!(page.contains("href=\"data.json\""));

    let csv = fs::read_to_string(&series).expect("series written");
    assert_eq!(csv.lines().count(), 13);
    assert!(fs::metadata(&json).expect("json written").len() > 0);
}

#[test]
fn archive_flag_writes_gzip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let series = dir.path().join("monthly.csv");

    bombo_dash()
        .arg("--no-progress")
        .arg("--archive-csv")
        .arg("--save-series")
        .arg(&series)
        .assert()
        .success();

    assert!(!series.exists());
    let archived = fs::read(dir.path().join("monthly.csv.gz")).expect("archive written");
    assert_eq!(&archived[..2], &[0x1f, 0x8b]);
}

#[test]
fn metric_subcommand_prints_single_value() {
    bombo_dash()
        .args(["metric", "total-gtv"])
        .assert()
        .success()
        .stdout("$70.0M\n");

    bombo_dash()
        .args(["metric", "total-users", "--raw"])
        .assert()
        .success()
        .stdout("801,492\n");
}

#[test]
fn unknown_metric_is_rejected() {
    bombo_dash()
        .args(["metric", "burn-rate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
