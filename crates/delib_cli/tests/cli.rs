//! Argument-parsing smoke tests. No network call is ever made here — every
//! case is rejected before a gateway would be touched.

use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn missing_question_is_rejected_by_clap() {
    Command::cargo_bin("delib")
        .unwrap()
        .args(["--opinion", "for it"])
        .assert()
        .failure();
}

#[test]
fn missing_opinions_is_rejected() {
    Command::cargo_bin("delib")
        .unwrap()
        .args(["--question", "well?"])
        .assert()
        .failure()
        .stderr(contains("opinion"));
}

#[test]
fn unknown_voting_strategy_is_rejected_by_clap() {
    Command::cargo_bin("delib")
        .unwrap()
        .args([
            "--question",
            "well?",
            "--opinion",
            "for it",
            "--opinion",
            "against it",
            "--voting-strategy",
            "nonsense",
        ])
        .assert()
        .failure();
}
