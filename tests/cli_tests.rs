//! Command-line surface tests.

use assert_cmd::Command;
use predicates::prelude::*;

fn record(ts: &str, er: &str) -> String {
    ["user", "action", ts, "url", "ip", "ref", er, "agent", "cookie"].join("\u{1}")
}

#[test]
fn missing_arguments_print_usage_and_fail() {
    Command::cargo_bin("pagestat")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn extra_arguments_print_usage_and_fail() {
    Command::cargo_bin("pagestat")
        .unwrap()
        .args(["in", "out", "4", "surplus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn full_run_writes_the_output_record() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page_views");
    let output = dir.path().join("out");
    std::fs::create_dir(&input).unwrap();
    std::fs::write(
        input.join("part-0"),
        format!("{}\n{}\n", record("2", "1.5"), record("3", "2.5")),
    )
    .unwrap();

    // Shrink the poll interval so the test does not sit through the
    // production 5s default.
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"poll_interval": "10ms"}"#).unwrap();

    Command::cargo_bin("pagestat")
        .unwrap()
        .arg(&input)
        .arg(&output)
        .arg("4")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    // The single input file combines into one partial (5, 4, 2); reduce
    // divides by the one arriving tuple, giving an average of 4.
    let written = std::fs::read_to_string(output.join("part-r-00000")).unwrap();
    assert_eq!(written, "all\t5\u{1}4\n");
}

#[test]
fn job_failure_is_logged_without_a_distinguished_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"poll_interval": "10ms"}"#).unwrap();

    Command::cargo_bin("pagestat")
        .unwrap()
        .arg(dir.path().join("does-not-exist"))
        .arg(dir.path().join("out"))
        .arg("4")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
}
