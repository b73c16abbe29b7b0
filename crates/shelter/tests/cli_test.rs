//! Integration tests for the `shelter` CLI binary.
//!
//! Covers argument parsing, help output, completions, form validation and
//! error exit codes. Backend-bound commands run against `--offline`, the
//! empty in-memory backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `shelter` binary with env isolation.
///
/// Clears all `SHELTER_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn shelter_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("shelter");
    cmd.env("HOME", "/tmp/shelter-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/shelter-cli-test-nonexistent")
        .env_remove("SHELTER_PROFILE")
        .env_remove("SHELTER_URL")
        .env_remove("SHELTER_API_KEY")
        .env_remove("SHELTER_OUTPUT")
        .env_remove("SHELTER_TIMEOUT")
        .env_remove("SHELTER_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn contact_args(email: &str, phone: &str) -> Vec<String> {
    [
        "submit",
        "contact",
        "--name",
        "Asha",
        "--email",
        email,
        "--phone",
        phone,
        "--subject",
        "Weekend visit",
        "--message",
        "Can I visit on Saturday?",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = shelter_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    shelter_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("animal shelter")
            .and(predicate::str::contains("animals"))
            .and(predicate::str::contains("volunteers"))
            .and(predicate::str::contains("lost-found")),
    );
}

#[test]
fn test_version_flag() {
    shelter_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shelter"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    shelter_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    shelter_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = shelter_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_animals_list_without_config() {
    shelter_cmd()
        .args(["animals", "list"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("config")
                .or(predicate::str::contains("Configuration"))
                .or(predicate::str::contains("profile")),
        );
}

#[test]
fn test_config_show_no_config() {
    // Falls back to the default config when no file exists.
    shelter_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_use_unknown_profile() {
    let output = shelter_cmd()
        .args(["config", "use", "staging"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("staging"));
}

#[test]
fn test_invalid_output_format() {
    let output = shelter_cmd()
        .args(["--output", "invalid", "animals", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about invalid output format:\n{text}"
    );
}

#[test]
fn test_invalid_url_scheme() {
    shelter_cmd()
        .args(["--url", "ftp://db.example.org", "--api-key", "k", "stats"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("url"));
}

// ── Forms ───────────────────────────────────────────────────────────

#[test]
fn test_submit_contact_rejects_bad_fields_before_connecting() {
    // No config and no --offline: validation must fail first.
    let output = shelter_cmd()
        .args(contact_args("not-an-email", "12345"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("email"), "Expected email error:\n{text}");
    assert!(text.contains("phone"), "Expected phone error:\n{text}");
}

#[test]
fn test_submit_contact_offline() {
    shelter_cmd()
        .arg("--offline")
        .args(contact_args("Asha@Example.org", "9876543210"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Message sent"));
}

#[test]
fn test_submit_contact_offline_json_lowercases_email() {
    shelter_cmd()
        .args(["--offline", "--output", "json"])
        .args(contact_args("Asha@Example.org", "9876543210"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("asha@example.org")
                .and(predicate::str::contains("Subject: Weekend visit")),
        );
}

#[test]
fn test_submit_volunteer_short_motivation() {
    shelter_cmd()
        .args([
            "--offline",
            "submit",
            "volunteer",
            "--first-name",
            "Ravi",
            "--last-name",
            "Menon",
            "--email",
            "ravi@example.org",
            "--phone",
            "9876543210",
            "--age",
            "24",
            "--address",
            "12 Beach Road",
            "--motivation",
            "dogs",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("motivation"));
}

#[test]
fn test_submit_donation_requires_positive_amount() {
    shelter_cmd()
        .args([
            "--offline",
            "submit",
            "donate",
            "--first-name",
            "Ravi",
            "--last-name",
            "Menon",
            "--email",
            "ravi@example.org",
            "--amount",
            "0",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("amount"));
}

// ── Offline backend ─────────────────────────────────────────────────

#[test]
fn test_offline_animals_list_is_empty() {
    shelter_cmd()
        .args(["--offline", "--output", "json", "animals", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_offline_animals_add() {
    shelter_cmd()
        .args([
            "--offline",
            "animals",
            "add",
            "Rex",
            "--species",
            "Dog",
            "--age",
            "3",
            "--placement",
            "both",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Added Rex"));
}

#[test]
fn test_animals_add_rejects_unknown_status() {
    shelter_cmd()
        .args([
            "--offline",
            "animals",
            "add",
            "Rex",
            "--species",
            "Dog",
            "--status",
            "available",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("status"));
}

#[test]
fn test_offline_status_change_unknown_animal() {
    shelter_cmd()
        .args(["--offline", "animals", "status", "Ghost", "Adopted"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Ghost"));
}

#[test]
fn test_offline_delete_unknown_message() {
    shelter_cmd()
        .args(["--offline", "messages", "delete", "42"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("messages list"));
}

#[test]
fn test_offline_stats() {
    shelter_cmd()
        .args(["--offline", "--output", "json", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_animals\": 0"));
}

#[test]
fn test_offline_activity_empty() {
    shelter_cmd()
        .args(["--offline", "activity"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No recent activities"));

    shelter_cmd()
        .args(["--offline", "--output", "json", "activity"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}
