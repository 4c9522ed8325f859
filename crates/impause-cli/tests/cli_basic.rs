//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the development data
//! directory (IMPAUSE_ENV=dev) and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "impause-cli", "--"])
        .args(args)
        .env("IMPAUSE_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help_lists_commands() {
    let (stdout, _, code) = run_cli(&["--help"]);
    assert_eq!(code, 0);
    for cmd in ["reflect", "history", "wrapped", "auth", "buddy", "config"] {
        assert!(stdout.contains(cmd), "help should mention {cmd}");
    }
}

#[test]
fn test_config_list_is_json() {
    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("config list JSON");
    assert!(parsed["endpoints"]["auth_base_url"].is_string());
    assert!(parsed["http"]["timeout_secs"].is_number());
}

#[test]
fn test_config_get_unknown_key_fails() {
    let (_, stderr, code) = run_cli(&["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_set_rejects_bad_value() {
    let (_, stderr, code) = run_cli(&["config", "set", "http.timeout_secs", "soon"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("timeout_secs"));
}

#[test]
fn test_config_keys_lists_settings() {
    let (stdout, _, code) = run_cli(&["config", "keys"]);
    assert_eq!(code, 0, "config keys failed");
    for key in [
        "profile.hourly_wage",
        "profile.currency",
        "privacy.share_impulse_purchases",
        "notifications.weekly_report",
        "reflection.default_preset",
    ] {
        assert!(stdout.contains(key), "config keys should list {key}");
    }
}

#[test]
fn test_config_reset_unknown_section_fails() {
    let (_, stderr, code) = run_cli(&["config", "reset", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_config_set_rejects_bad_wage() {
    let (_, stderr, code) = run_cli(&["config", "set", "profile.hourly_wage", "-3"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("hourly wage"));
}

#[test]
fn test_reflect_rejects_invalid_purchase() {
    let (_, stderr, code) = run_cli(&[
        "reflect",
        "--name",
        "x",
        "--price",
        "0",
        "--category",
        "Electronics",
        "--reason",
        "want",
        "--need",
        "5",
        "--offline",
    ]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid purchase"));
    assert!(stderr.contains("name"));
    assert!(stderr.contains("price"));
}

#[test]
fn test_reflect_rejects_unknown_preset() {
    let (_, _, code) = run_cli(&[
        "reflect", "--name", "Lamp", "--price", "40", "--category", "Other", "--reason",
        "reading nook", "--need", "4", "--preset", "45m",
    ]);
    assert_eq!(code, 2, "clap should reject the preset");
}

#[test]
fn test_history_json() {
    let (stdout, _, code) = run_cli(&["history", "--json"]);
    assert_eq!(code, 0, "history --json failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("history JSON");
    assert!(parsed["entries"].is_array());
    assert!(parsed["summary"]["declined"].is_number());
}

#[test]
fn test_wrapped_show_json_has_timeframe() {
    let (stdout, _, code) = run_cli(&["wrapped", "show", "--timeframe", "yearly", "--json"]);
    assert_eq!(code, 0, "wrapped show failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("wrapped JSON");
    assert_eq!(parsed["timeframe"], "yearly");
    assert!(parsed["moneyPersona"].is_string());
}

#[test]
fn test_wrapped_show_single_slide() {
    let (stdout, _, code) = run_cli(&["wrapped", "show", "--timeframe", "monthly", "--slide", "2"]);
    assert_eq!(code, 0, "wrapped show --slide failed");
    assert!(stdout.contains("(2/7"), "should print only the second slide: {stdout}");
    assert_eq!(stdout.matches("── ").count(), 1);
}

#[test]
fn test_wrapped_slide_is_one_based() {
    let (_, _, code) = run_cli(&["wrapped", "show", "--slide", "0"]);
    assert_eq!(code, 2, "clap should reject slide 0");
}

#[test]
fn test_buddy_invite_rejects_bad_email() {
    let (_, stderr, code) = run_cli(&["buddy", "invite", "not-an-email"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("email"));
}

#[test]
fn test_buddy_notifications_json() {
    let (stdout, _, code) = run_cli(&["buddy", "notifications", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("notifications JSON");
    assert!(parsed["items"].is_array());
}

#[test]
fn test_completions() {
    let (stdout, _, code) = run_cli(&["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("impause-cli"));
}
